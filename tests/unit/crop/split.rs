use std::path::Path;

use super::*;
use crate::crop::{CropMode, CropModeDef};
use crate::foundation::core::Size;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_crop").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_photo(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
    let img =
        image::RgbImage::from_fn(w, h, |x, y| image::Rgb([(x % 256) as u8, (y % 256) as u8, 0]));
    let path = dir.join(name);
    std::fs::write(&path, encode_jpeg(&DynamicImage::ImageRgb8(img), 90).unwrap()).unwrap();
    path
}

#[test]
fn square_to_three_by_two_trims_height() {
    let r = center_crop_rect(3000, 3000, 1.5);
    assert_eq!(r, Rect::new(0, 500, 3000, 2000));
    assert_eq!(slice_spans(r.width, 2), vec![(0, 1500), (1500, 1500)]);
}

#[test]
fn wide_photo_trims_width_with_floor_centering() {
    let r = center_crop_rect(1001, 300, 1.5);
    assert_eq!(r, Rect::new(275, 0, 450, 300));
    let r = center_crop_rect(1000, 501, 9.0 / 5.0);
    assert_eq!((r.width, r.height), (902, 501));
    assert_eq!(r.left, 49);
}

#[test]
fn centered_crop_ratio_is_close_to_target() {
    for (w, h) in [(3000, 3000), (4000, 3000), (3000, 4000), (6000, 4000), (4032, 3024)] {
        for ratio in [1.5, 1.8, 0.75, 2.0] {
            let r = center_crop_rect(w, h, ratio);
            assert!(r.left + r.width <= w && r.top + r.height <= h);
            assert!((r.ratio() - ratio).abs() < 1e-3, "{w}x{h} @ {ratio}");
        }
    }
    // Small photos stay in bounds even when rounding dominates.
    for (w, h) in [(1, 1), (7, 3), (640, 1136)] {
        let r = center_crop_rect(w, h, 1.8);
        assert!(r.width >= 1 && r.height >= 1);
        assert!(r.left + r.width <= w && r.top + r.height <= h);
    }
}

#[test]
fn slice_widths_sum_to_crop_width() {
    for width in [1u32, 2, 3, 100, 1001, 2999, 3000] {
        for parts in [2u32, 3] {
            let spans = slice_spans(width, parts);
            assert_eq!(spans.len(), parts as usize);
            assert_eq!(spans.iter().map(|s| s.1).sum::<u32>(), width);
            for pair in spans.windows(2) {
                assert_eq!(pair[0].0 + pair[0].1, pair[1].0);
            }
        }
    }
    assert_eq!(slice_spans(100, 3), vec![(0, 33), (33, 33), (66, 34)]);
}

#[test]
fn explicit_rect_is_clamped_and_ratio_checked() {
    let rect = CropRectInput {
        left: -20.0,
        top: 10.4,
        width: 300.0,
        height: 200.0,
    };
    assert_eq!(clamp_crop_rect(1000, 1000, rect), Rect::new(0, 10, 300, 200));
    assert_eq!(resolve_crop(1000, 1000, 1.5, Some(rect)), Rect::new(0, 10, 300, 200));

    let oversized = CropRectInput {
        left: 900.0,
        top: 900.0,
        width: 5000.0,
        height: 5000.0,
    };
    assert_eq!(clamp_crop_rect(600, 400, oversized), Rect::new(0, 0, 600, 400));

    let wrong_ratio = CropRectInput {
        left: 0.0,
        top: 0.0,
        width: 300.0,
        height: 300.0,
    };
    assert_eq!(
        resolve_crop(1000, 1000, 1.5, Some(wrong_ratio)),
        center_crop_rect(1000, 1000, 1.5)
    );
}

#[test]
fn custom_mode_validation() {
    assert!(CropModeDef::custom(Some(4.0), Some(3.0), Some(2)).is_ok());
    for (w, h, p) in [
        (Some(0.0), Some(3.0), Some(2)),
        (Some(-1.0), Some(3.0), Some(2)),
        (None, Some(3.0), Some(2)),
        (Some(4.0), Some(0.0), Some(2)),
        (Some(4.0), Some(f64::NAN), Some(3)),
        (Some(4.0), Some(3.0), Some(1)),
        (Some(4.0), Some(3.0), Some(4)),
        (Some(4.0), Some(3.0), None),
    ] {
        let err = CropModeDef::custom(w, h, p).unwrap_err();
        assert!(matches!(err, FramemarkError::Validation(_)), "{w:?} {h:?} {p:?}");
    }
}

#[test]
fn mode_names_parse_and_serialize() {
    for mode in [CropMode::Two3x4, CropMode::Three3x5, CropMode::Custom] {
        assert_eq!(mode.as_str().parse::<CropMode>().unwrap(), mode);
        assert_eq!(
            serde_json::to_value(mode).unwrap(),
            serde_json::json!(mode.as_str())
        );
    }
    assert!("four_1x1".parse::<CropMode>().is_err());
}

#[test]
fn split_writes_ordered_slices() {
    let dir = scratch_dir("two");
    let photo = write_photo(&dir, "square.jpg", 300, 300);
    let req = CropSplitRequest::new(&photo, dir.join("out"), CropMode::Two3x4);
    let paths = crop_split(&req).unwrap();

    assert_eq!(
        paths,
        vec![
            dir.join("out").join("square_part_1_of_2.jpg"),
            dir.join("out").join("square_part_2_of_2.jpg"),
        ]
    );
    for p in &paths {
        assert_eq!(probe_path(p).unwrap(), Size::new(150, 200));
    }
}

#[test]
fn split_three_with_remainder() {
    let dir = scratch_dir("three");
    let photo = write_photo(&dir, "wide.jpg", 1000, 500);
    let req = CropSplitRequest::new(&photo, dir.join("out"), CropMode::Three3x5);
    let paths = crop_split(&req).unwrap();
    let widths: Vec<u32> = paths.iter().map(|p| probe_path(p).unwrap().width).collect();
    assert_eq!(widths, vec![300, 300, 300]);
    assert!(paths.iter().all(|p| probe_path(p).unwrap().height == 500));
}

#[test]
fn request_validation() {
    let dir = scratch_dir("invalid");
    let missing = CropSplitRequest::new(dir.join("nope.jpg"), dir.join("out"), CropMode::Two3x4);
    assert!(matches!(
        crop_split(&missing).unwrap_err(),
        FramemarkError::Validation(_)
    ));

    let photo = write_photo(&dir, "p.jpg", 40, 40);
    let no_out = CropSplitRequest::new(&photo, "", CropMode::Two3x4);
    assert!(matches!(
        crop_split(&no_out).unwrap_err(),
        FramemarkError::Validation(_)
    ));

    let mut bad_custom = CropSplitRequest::new(&photo, dir.join("out"), CropMode::Custom);
    bad_custom.crop_w = Some(3.0);
    bad_custom.crop_h = Some(2.0);
    bad_custom.parts = Some(5);
    let err = crop_split(&bad_custom).unwrap_err();
    assert_eq!(err.to_string(), "validation error: parts must be 2 or 3");
}

#[test]
fn crop_narrower_than_slice_count_writes_nothing() {
    let dir = scratch_dir("narrow");
    let photo = write_photo(&dir, "tiny.jpg", 2, 2);
    let out = dir.join("out");
    let req = CropSplitRequest::new(&photo, &out, CropMode::Three3x5);
    let err = crop_split(&req).unwrap_err();
    assert!(matches!(err, FramemarkError::Validation(_)), "{err}");
    assert!(std::fs::read_dir(&out).unwrap().next().is_none());
}

#[test]
fn request_parses_from_camel_case_json() {
    let req: CropSplitRequest = serde_json::from_value(serde_json::json!({
        "path": "a.jpg",
        "outputDir": "out",
        "mode": "custom",
        "cropW": 4,
        "cropH": 3,
        "parts": 2,
        "cropRect": {"left": 0, "top": 0, "width": 40, "height": 30}
    }))
    .unwrap();
    assert_eq!(req.mode, CropMode::Custom);
    assert_eq!(req.quality(), 92);
    assert_eq!(req.mode_def().unwrap().parts, 2);
    assert!(req.crop_rect.is_some());
}
