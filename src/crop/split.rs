use std::path::PathBuf;

use anyhow::Context as _;
use image::DynamicImage;
use rayon::prelude::*;
use tracing::info;

use crate::assets::decode::{encode_jpeg, open_oriented, probe_path};
use crate::crop::{CropRectInput, CropSplitRequest};
use crate::foundation::core::{Rect, round_half_up};
use crate::foundation::error::{FramemarkError, FramemarkResult};

/// Tolerance when comparing an explicit rect's ratio to the mode ratio.
const RATIO_EPSILON: f64 = 1e-3;

fn clamp_i64(v: i64, min: i64, max: i64) -> u32 {
    v.clamp(min, max.max(min)) as u32
}

/// Largest centered rect of `ratio` inside `w x h`, trimming only the overshooting axis.
pub fn center_crop_rect(w: u32, h: u32, ratio: f64) -> Rect {
    if w == 0 || h == 0 {
        return Rect::default();
    }
    let (wf, hf) = (f64::from(w), f64::from(h));
    let mut cw = i64::from(w);
    let mut ch = i64::from(h);
    if wf / hf > ratio {
        cw = round_half_up(hf * ratio);
    } else {
        ch = round_half_up(wf / ratio);
    }
    let cw = clamp_i64(cw, 1, i64::from(w));
    let ch = clamp_i64(ch, 1, i64::from(h));
    let left = (w - cw) / 2;
    let top = (h - ch) / 2;
    Rect::new(left, top, cw, ch)
}

/// Round an explicit rect and clamp it inside `w x h`, keeping at least 1x1.
pub fn clamp_crop_rect(w: u32, h: u32, rect: CropRectInput) -> Rect {
    let width = clamp_i64(round_half_up(rect.width), 1, i64::from(w));
    let height = clamp_i64(round_half_up(rect.height), 1, i64::from(h));
    let left = clamp_i64(round_half_up(rect.left), 0, i64::from(w) - i64::from(width));
    let top = clamp_i64(round_half_up(rect.top), 0, i64::from(h) - i64::from(height));
    Rect::new(left, top, width, height)
}

/// `(left, width)` of each slice; the last slice absorbs the remainder.
pub fn slice_spans(crop_width: u32, parts: u32) -> Vec<(u32, u32)> {
    let parts = parts.max(1);
    let part_w = crop_width / parts;
    (0..parts)
        .map(|i| {
            let left = i * part_w;
            let width = if i == parts - 1 {
                crop_width - part_w * (parts - 1)
            } else {
                part_w
            };
            (left, width)
        })
        .collect()
}

/// Pick the crop for an oriented `w x h` photo: the explicit rect when its ratio matches,
/// otherwise the centered one.
pub fn resolve_crop(w: u32, h: u32, ratio: f64, explicit: Option<CropRectInput>) -> Rect {
    let centered = center_crop_rect(w, h, ratio);
    let Some(input) = explicit else {
        return centered;
    };
    let rect = clamp_crop_rect(w, h, input);
    if (rect.ratio() - ratio).abs() <= RATIO_EPSILON {
        rect
    } else {
        tracing::debug!(?rect, ratio, "crop rect ratio mismatch, using centered crop");
        centered
    }
}

/// Crop the photo to the mode ratio and write its slices as
/// `<stem>_part_<i>_of_<parts>.jpg` into the output dir. Returns the paths in slice order.
pub fn crop_split(req: &CropSplitRequest) -> FramemarkResult<Vec<PathBuf>> {
    if req.path.as_os_str().is_empty() {
        return Err(FramemarkError::validation("path is required"));
    }
    if req.output_dir.as_os_str().is_empty() {
        return Err(FramemarkError::validation("outputDir is required"));
    }
    if !req.path.exists() {
        return Err(FramemarkError::validation(format!(
            "file not exists: {}",
            req.path.display()
        )));
    }
    std::fs::create_dir_all(&req.output_dir)
        .with_context(|| format!("create output dir '{}'", req.output_dir.display()))?;

    let def = req.mode_def()?;
    let quality = req.quality();

    let size = probe_path(&req.path)?;
    if size.is_empty() {
        return Err(FramemarkError::validation("unable to read image size"));
    }
    let crop = resolve_crop(size.width, size.height, def.ratio(), req.crop_rect);
    info!(
        mode = %req.mode,
        left = crop.left,
        top = crop.top,
        width = crop.width,
        height = crop.height,
        "crop"
    );
    if crop.width < def.parts {
        return Err(FramemarkError::validation(format!(
            "crop width {} is too narrow for {} slices",
            crop.width, def.parts
        )));
    }

    let img = open_oriented(&req.path)?.crop_imm(crop.left, crop.top, crop.width, crop.height);
    let stem = req
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_owned());

    slice_spans(crop.width, def.parts)
        .into_par_iter()
        .enumerate()
        .map(|(i, (left, width))| -> FramemarkResult<PathBuf> {
            let piece: DynamicImage = img.crop_imm(left, 0, width, crop.height);
            let bytes = encode_jpeg(&piece, quality)?;
            let out = req
                .output_dir
                .join(format!("{stem}_part_{}_of_{}.jpg", i + 1, def.parts));
            std::fs::write(&out, bytes).with_context(|| format!("write '{}'", out.display()))?;
            Ok(out)
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/crop/split.rs"]
mod tests;
