use super::*;

#[test]
fn layout_options_accept_partial_json() {
    let opts: LayoutOptions = serde_json::from_str(
        r#"{"bg_rate_show": true, "bg_rate": {"w": "3", "h": 4}, "shadow_show": true, "shadow": 6}"#,
    )
    .unwrap();
    assert!(opts.bg_rate_show);
    assert_eq!(opts.bg_rate.ratio(), Some(0.75));
    assert_eq!(opts.shadow, 6.0);
    assert!(!opts.landscape);
    assert_eq!(opts.export_quality(), 100);
}

#[test]
fn corner_and_shadow_strength_defaults() {
    let opts: LayoutOptions =
        serde_json::from_str(r#"{"radius_show": true, "shadow_show": true}"#).unwrap();
    assert_eq!(opts.radius, None);
    assert!((opts.corner_radius(200) - 4.2).abs() < 1e-9);
    assert_eq!(opts.shadow_strength(), 6.0);

    let opts: LayoutOptions =
        serde_json::from_str(r#"{"radius_show": false, "radius": 5, "shadow": 3}"#).unwrap();
    assert_eq!(opts.corner_radius(200), 0.0);
    assert_eq!(opts.shadow_strength(), 3.0);
}

#[test]
fn bg_rate_requires_positive_components() {
    assert_eq!(BgRate::new(0.0, 4.0).ratio(), None);
    assert_eq!(BgRate::new(3.0, -1.0).ratio(), None);
    assert_eq!(BgRate::new(f64::NAN, 1.0).ratio(), None);
}

#[test]
fn empty_string_rate_is_zero() {
    let rate: BgRate = serde_json::from_str(r#"{"w": "", "h": "4"}"#).unwrap();
    assert_eq!(rate.w, 0.0);
    assert_eq!(rate.ratio(), None);
}

#[test]
fn main_width_fraction_defaults_to_ninety_percent() {
    let mut opts = LayoutOptions::default();
    assert!((opts.main_width_fraction() - 0.9).abs() < 1e-12);
    opts.main_img_w_rate = Some(0.0);
    assert!((opts.main_width_fraction() - 0.9).abs() < 1e-12);
    opts.main_img_w_rate = Some(80.0);
    assert!((opts.main_width_fraction() - 0.8).abs() < 1e-12);
}

#[test]
fn app_config_orders_builtin_fields_first() {
    let cfg = AppConfig::from_reader(
        br#"{
            "options": {"landscape": true},
            "output": "/tmp/out",
            "cacheDir": "/tmp/cache",
            "tempFields": [{"key": "model"}],
            "customTempFields": [{"key": "custom"}]
        }"#
        .as_slice(),
    )
    .unwrap();
    assert!(cfg.options.landscape);
    assert_eq!(cfg.cache_dir, PathBuf::from("/tmp/cache"));
    let fields = cfg.all_fields();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0]["key"], "model");
    assert_eq!(fields[1]["key"], "custom");
}

#[test]
fn app_config_missing_file_is_validation_error() {
    let err = AppConfig::from_path("target/does-not-exist/config.json").unwrap_err();
    assert!(matches!(err, FramemarkError::Validation(_)));
}
