use super::*;
use crate::assets::decode::encode_png;
use image::{Rgba, RgbaImage};

fn png(w: u32, h: u32) -> LayerSource {
    let img = RgbaImage::from_pixel(w, h, Rgba([1, 2, 3, 255]));
    LayerSource::encoded(encode_png(&img).unwrap())
}

#[test]
fn strategy_order_is_fixed_per_mode() {
    assert_eq!(
        FitMode::Forced.strategies(),
        &[FitStrategy::ForcedResize, FitStrategy::Passthrough]
    );
    assert_eq!(
        FitMode::Conditional.strategies(),
        &[
            FitStrategy::ConditionalResize,
            FitStrategy::ProbeFailureResize,
            FitStrategy::Passthrough
        ]
    );
}

#[test]
fn conditional_passes_through_layers_that_fit() {
    let fitted = fit_to_bounds(&png(40, 20), Size::new(100, 100), FitMode::Conditional, "t");
    assert_eq!(fitted.outcome, FitOutcome::Unchanged);
    assert_eq!(fitted.size, Size::new(40, 20));
    assert!(matches!(fitted.source, LayerSource::Encoded(_)));
}

#[test]
fn conditional_resizes_oversized_layers_keeping_aspect() {
    let fitted = fit_to_bounds(&png(400, 100), Size::new(200, 200), FitMode::Conditional, "t");
    assert_eq!(fitted.outcome, FitOutcome::Resized);
    assert_eq!(fitted.strategy, FitStrategy::ConditionalResize);
    assert_eq!(fitted.size, Size::new(200, 50));
    assert_eq!(fitted.source.probe().unwrap(), Size::new(200, 50));
}

#[test]
fn forced_never_enlarges() {
    let fitted = fit_to_bounds(&png(30, 10), Size::new(300, 300), FitMode::Forced, "t");
    assert_eq!(fitted.outcome, FitOutcome::Resized);
    assert_eq!(fitted.size, Size::new(30, 10));
}

#[test]
fn undecodable_data_passes_through_with_zero_size() {
    let junk = LayerSource::encoded(b"not an image".to_vec());
    for mode in [FitMode::Forced, FitMode::Conditional] {
        let fitted = fit_to_bounds(&junk, Size::new(10, 10), mode, "junk");
        assert_eq!(fitted.outcome, FitOutcome::Unknown);
        assert_eq!(fitted.strategy, FitStrategy::Passthrough);
        assert_eq!(fitted.size, Size::default());
    }
}

#[test]
fn empty_raster_is_reported_unknown() {
    let empty = LayerSource::raster(RgbaImage::new(0, 0));
    for mode in [FitMode::Forced, FitMode::Conditional] {
        let fitted = fit_to_bounds(&empty, Size::new(10, 10), mode, "empty");
        assert_eq!(fitted.outcome, FitOutcome::Unknown);
        assert_eq!(fitted.size, Size::default());
    }
}

#[test]
fn output_never_exceeds_bounds() {
    let layers = [(1, 1), (1, 900), (900, 1), (64, 64), (333, 77)];
    let bounds = [(1, 1), (5, 500), (500, 5), (64, 64), (100, 100)];
    for &(lw, lh) in &layers {
        let src = LayerSource::raster(RgbaImage::new(lw, lh));
        for &(bw, bh) in &bounds {
            let b = Size::new(bw, bh);
            for mode in [FitMode::Forced, FitMode::Conditional] {
                let fitted = fit_to_bounds(&src, b, mode, "grid");
                assert!(fitted.size.fits_within(b), "{lw}x{lh} in {bw}x{bh} {mode:?}");
                if fitted.outcome != FitOutcome::Unknown {
                    assert_eq!(fitted.source.probe().unwrap(), fitted.size);
                }
            }
        }
    }
}
