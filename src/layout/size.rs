use serde::{Deserialize, Serialize};

use crate::foundation::config::LayoutOptions;
use crate::foundation::core::{Size, ceil_dim, round_dim, scale_dim};

/// Intrinsic and aspect-adjusted ("reset") working dimensions of a source photo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeInfo {
    /// Orientation-corrected photo width (possibly downscaled for preview).
    pub w: u32,
    /// Orientation-corrected photo height (possibly downscaled for preview).
    pub h: u32,
    /// Aspect-adjusted target width.
    pub reset_w: u32,
    /// Aspect-adjusted target height.
    pub reset_h: u32,
}

impl SizeInfo {
    /// Largest of the four dimensions.
    pub fn max_dim(&self) -> u32 {
        self.w.max(self.h).max(self.reset_w).max(self.reset_h)
    }

    /// Intrinsic photo size.
    pub fn photo(&self) -> Size {
        Size::new(self.w, self.h)
    }
}

/// Derive [`SizeInfo`] from the orientation-corrected photo size and layout options.
///
/// Only the axis orthogonal to the longer source side is adjusted when a background ratio is
/// configured; `landscape` then swaps the reset axes if the result is portrait.
pub fn negotiate(photo: Size, opts: &LayoutOptions) -> SizeInfo {
    let w = photo.width.max(1);
    let h = photo.height.max(1);
    let mut reset_w = w;
    let mut reset_h = h;

    if opts.bg_rate_show
        && let Some(rate) = opts.bg_rate.ratio()
    {
        if w >= h {
            reset_h = round_dim(f64::from(w) / rate);
        } else {
            reset_w = round_dim(f64::from(h) * rate);
        }
    }

    if opts.landscape && reset_w < reset_h {
        std::mem::swap(&mut reset_w, &mut reset_h);
    }

    SizeInfo {
        w,
        h,
        reset_w,
        reset_h,
    }
}

/// Scale factor that brings `info` within `target_max`, never above 1.
pub fn preview_scale(info: &SizeInfo, target_max: u32) -> f64 {
    let base_max = info.max_dim();
    if base_max == 0 || base_max <= target_max {
        return 1.0;
    }
    (f64::from(target_max) / f64::from(base_max)).min(1.0)
}

/// Downscale every field of `info` so none exceeds `target_max`.
///
/// Returns the scaled info and the factor applied (1 when nothing changed).
pub fn scale_for_preview(info: SizeInfo, target_max: u32) -> (SizeInfo, f64) {
    let scale = preview_scale(&info, target_max);
    if scale >= 1.0 {
        return (info, 1.0);
    }
    let scaled = SizeInfo {
        w: scale_dim(info.w, scale),
        h: scale_dim(info.h, scale),
        reset_w: scale_dim(info.reset_w, scale),
        reset_h: scale_dim(info.reset_h, scale),
    };
    (scaled, scale)
}

/// Background canvas size for a given content height.
///
/// A zero `content_height` falls back to the taller of the photo and the reset height. The
/// result is widened (keeping the reset aspect) when the photo would exceed the configured
/// share of the background width.
pub fn background_size(info: &SizeInfo, opts: &LayoutOptions, content_height: u32) -> Size {
    let wh_rate = f64::from(info.reset_w) / f64::from(info.reset_h.max(1));

    let mut bg_h = if content_height > 0 {
        content_height
    } else {
        info.h.max(info.reset_h)
    };
    let mut bg_w = ceil_dim(f64::from(bg_h) * wh_rate);

    let main_rate = opts.main_width_fraction();
    if f64::from(info.w) / f64::from(bg_w) > main_rate {
        bg_w = ceil_dim(f64::from(info.w) / main_rate);
        bg_h = ceil_dim(f64::from(bg_w) / wh_rate);
    }

    Size::new(bg_w, bg_h)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/size.rs"]
mod tests;
