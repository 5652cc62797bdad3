use serde::{Deserialize, Serialize};

/// Pixel dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    #[serde(rename = "w")]
    pub width: u32,
    /// Height in pixels.
    #[serde(rename = "h")]
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Largest of the two axes.
    pub fn max_side(self) -> u32 {
        self.width.max(self.height)
    }

    /// Return `true` when either axis is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Return `true` when both axes are within `bounds`.
    pub fn fits_within(self, bounds: Size) -> bool {
        self.width <= bounds.width && self.height <= bounds.height
    }

    /// Multiply both axes by `scale`, rounding and keeping each axis at least 1.
    pub fn scaled(self, scale: f64) -> Self {
        Self {
            width: scale_dim(self.width, scale),
            height: scale_dim(self.height, scale),
        }
    }
}

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub left: u32,
    /// Top edge.
    pub top: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a new rect.
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Size of the rect.
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Width divided by height; zero for an empty rect.
    pub fn ratio(self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Round half away from negative infinity, matching the usual "round to nearest, .5 up" rule
/// used for pixel offsets.
pub fn round_half_up(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

/// Round to a pixel dimension, never below 1.
pub fn round_dim(v: f64) -> u32 {
    round_half_up(v).clamp(1, i64::from(u32::MAX)) as u32
}

/// Ceil to a pixel dimension, never below 1.
pub fn ceil_dim(v: f64) -> u32 {
    (v.ceil() as i64).clamp(1, i64::from(u32::MAX)) as u32
}

/// Scale a single dimension by `scale`, rounding and keeping it at least 1.
pub fn scale_dim(v: u32, scale: f64) -> u32 {
    round_dim(f64::from(v) * scale)
}

/// Clamp a signed pixel offset into `[0, max(0, limit)]`.
pub fn clamp_offset(v: i64, limit: i64) -> u32 {
    v.clamp(0, limit.max(0)) as u32
}

/// Offset that centers `inner` inside `outer`, clamped so the inner span stays in bounds.
pub fn center_offset(outer: u32, inner: u32) -> u32 {
    let slack = i64::from(outer) - i64::from(inner);
    let raw = round_half_up(slack as f64 / 2.0);
    clamp_offset(raw, slack)
}

/// Compute dimensions that fit inside `bounds` preserving aspect ratio, never enlarging.
///
/// Degenerate inputs (zero on any axis) yield `bounds`-clamped sizes of at least 1.
pub fn fit_inside(src: Size, bounds: Size) -> Size {
    let bw = bounds.width.max(1);
    let bh = bounds.height.max(1);
    if src.is_empty() {
        return Size::new(src.width.clamp(1, bw), src.height.clamp(1, bh));
    }
    if src.fits_within(Size::new(bw, bh)) {
        return src;
    }

    let ratio_w = f64::from(bw) / f64::from(src.width);
    let ratio_h = f64::from(bh) / f64::from(src.height);
    if ratio_w <= ratio_h {
        let h = round_dim(f64::from(src.height) * ratio_w).min(bh);
        Size::new(bw, h)
    } else {
        let w = round_dim(f64::from(src.width) * ratio_h).min(bw);
        Size::new(w, bh)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
