use std::path::PathBuf;

use super::*;
use crate::assets::decode::probe_path;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_background").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_photo(dir: &Path) -> PathBuf {
    let mut img = RgbaImage::from_pixel(60, 40, Rgba([20, 40, 60, 255]));
    for x in 0..30 {
        for y in 0..40 {
            img.put_pixel(x, y, Rgba([220, 180, 40, 255]));
        }
    }
    let path = dir.join("photo.jpg");
    std::fs::write(&path, encode_jpeg(&DynamicImage::ImageRgba8(img), 95).unwrap()).unwrap();
    path
}

#[test]
fn style_follows_options() {
    let mut opts = LayoutOptions::default();
    assert_eq!(
        BackgroundStyle::from_options(&opts, false),
        BackgroundStyle::Blur(BlurParams::EXPORT)
    );
    assert_eq!(
        BackgroundStyle::from_options(&opts, true),
        BackgroundStyle::Blur(BlurParams::PREVIEW)
    );

    opts.solid_bg = true;
    opts.solid_color = Some("#102030".to_string());
    let style = BackgroundStyle::from_options(&opts, true);
    assert_eq!(style, BackgroundStyle::Solid(Rgba([16, 32, 48, 255])));
    assert_eq!(style.canvas_color(), Rgba([16, 32, 48, 255]));
}

#[test]
fn solid_background_fills_exact_size() {
    let img = render_background(
        Path::new("unused.jpg"),
        Size::new(7, 5),
        &BackgroundStyle::Solid(WHITE),
    )
    .unwrap();
    assert_eq!(img.dimensions(), (7, 5));
    assert!(img.pixels().all(|p| *p == WHITE));
}

#[test]
fn blurred_background_is_stretched_to_size() {
    let dir = scratch_dir("blur");
    let photo = write_photo(&dir);
    let dest = dir.join("bg.jpg");
    let brightness = write_background(
        &photo,
        Size::new(90, 120),
        &BackgroundStyle::Blur(BlurParams::PREVIEW),
        &dest,
    )
    .unwrap();
    assert_eq!(probe_path(&dest).unwrap(), Size::new(90, 120));
    assert!(brightness > 40.0 && brightness < 147.0, "{brightness}");
}

#[test]
fn brightness_averages_color_channels() {
    let mut img = RgbaImage::from_pixel(2, 1, Rgba([30, 60, 90, 255]));
    img.put_pixel(1, 0, Rgba([0, 0, 0, 0]));
    assert_eq!(average_brightness(&img), 30.0);
    assert_eq!(average_brightness(&RgbaImage::new(0, 0)), 0.0);
}

#[test]
fn blurred_background_of_missing_photo_is_codec_error() {
    let err = render_background(
        Path::new("target/unit_background/missing.jpg"),
        Size::new(10, 10),
        &BackgroundStyle::Blur(BlurParams::PREVIEW),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        crate::foundation::error::FramemarkError::Codec { .. }
    ));
}
