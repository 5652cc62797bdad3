use super::*;

#[test]
fn round_half_up_matches_pixel_rounding() {
    assert_eq!(round_half_up(2.5), 3);
    assert_eq!(round_half_up(2.49), 2);
    assert_eq!(round_half_up(-0.5), 0);
    assert_eq!(round_half_up(5333.333), 5333);
}

#[test]
fn dims_never_drop_below_one() {
    assert_eq!(round_dim(0.2), 1);
    assert_eq!(ceil_dim(0.0), 1);
    assert_eq!(scale_dim(3, 0.01), 1);
    assert_eq!(scale_dim(4000, 0.275), 1100);
}

#[test]
fn center_offset_clamps_oversized_inner() {
    assert_eq!(center_offset(100, 50), 25);
    assert_eq!(center_offset(101, 50), 26);
    assert_eq!(center_offset(50, 100), 0);
}

#[test]
fn fit_inside_never_enlarges() {
    let s = fit_inside(Size::new(40, 20), Size::new(400, 300));
    assert_eq!(s, Size::new(40, 20));
}

#[test]
fn fit_inside_preserves_aspect_when_shrinking() {
    assert_eq!(
        fit_inside(Size::new(800, 400), Size::new(400, 300)),
        Size::new(400, 200)
    );
    assert_eq!(
        fit_inside(Size::new(400, 800), Size::new(400, 300)),
        Size::new(150, 300)
    );
}

#[test]
fn fit_inside_handles_degenerate_sizes() {
    let bounds = Size::new(10, 10);
    for src in [Size::new(0, 0), Size::new(0, 50), Size::new(50, 0)] {
        let out = fit_inside(src, bounds);
        assert!(out.fits_within(bounds));
        assert!(!out.is_empty());
    }
}

#[test]
fn rect_ratio_of_empty_is_zero() {
    assert_eq!(Rect::new(0, 0, 10, 0).ratio(), 0.0);
    assert!((Rect::new(0, 0, 3, 2).ratio() - 1.5).abs() < 1e-12);
}
