use std::path::Path;

use anyhow::Context as _;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

use crate::assets::color::{WHITE, color_or_white};
use crate::assets::decode::{encode_jpeg, open_oriented};
use crate::foundation::config::LayoutOptions;
use crate::foundation::core::Size;
use crate::foundation::error::FramemarkResult;
use crate::render::blur::blur_image;

/// Knobs of the squash-blur-stretch background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlurParams {
    /// Side of the square the source is squashed into before blurring.
    pub working_size: u32,
    /// Gaussian radius at the working size.
    pub radius: u32,
    /// Gaussian sigma at the working size.
    pub sigma: f32,
    /// JPEG quality of the cached background.
    pub quality: u8,
}

impl BlurParams {
    /// Full-fidelity export background.
    pub const EXPORT: Self = Self {
        working_size: 512,
        radius: 34,
        sigma: 17.0,
        quality: 90,
    };

    /// Fast preview background.
    pub const PREVIEW: Self = Self {
        working_size: 128,
        radius: 8,
        sigma: 4.0,
        quality: 60,
    };
}

/// How the background layer is produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BackgroundStyle {
    /// Flat fill.
    Solid(Rgba<u8>),
    /// Blurred, stretched copy of the source photo.
    Blur(BlurParams),
}

impl BackgroundStyle {
    /// Pick the style from layout options.
    pub fn from_options(opts: &LayoutOptions, preview: bool) -> Self {
        if opts.solid_bg {
            Self::Solid(color_or_white(opts.solid_color.as_deref()))
        } else if preview {
            Self::Blur(BlurParams::PREVIEW)
        } else {
            Self::Blur(BlurParams::EXPORT)
        }
    }

    /// Color the composite canvas starts from.
    pub fn canvas_color(&self) -> Rgba<u8> {
        match self {
            Self::Solid(c) => *c,
            Self::Blur(_) => WHITE,
        }
    }

    fn quality(&self) -> u8 {
        match self {
            Self::Solid(_) => 90,
            Self::Blur(p) => p.quality,
        }
    }
}

/// Render the background raster at exactly `size`.
pub fn render_background(
    source: &Path,
    size: Size,
    style: &BackgroundStyle,
) -> FramemarkResult<RgbaImage> {
    let (w, h) = (size.width.max(1), size.height.max(1));
    match style {
        BackgroundStyle::Solid(color) => Ok(RgbaImage::from_pixel(w, h, *color)),
        BackgroundStyle::Blur(params) => {
            let side = params.working_size.max(1);
            let img = open_oriented(source)?.into_rgba8();
            let squashed = imageops::resize(&img, side, side, FilterType::Triangle);
            let blurred = blur_image(&squashed, params.radius, params.sigma)?;
            Ok(imageops::resize(&blurred, w, h, FilterType::Triangle))
        }
    }
}

/// Mean of `(r + g + b) / 3` over every pixel, in `0..=255`.
pub fn average_brightness(img: &RgbaImage) -> f64 {
    let n = u64::from(img.width()) * u64::from(img.height());
    if n == 0 {
        return 0.0;
    }
    let sum: u64 = img
        .pixels()
        .map(|p| u64::from(p.0[0]) + u64::from(p.0[1]) + u64::from(p.0[2]))
        .sum();
    sum as f64 / 3.0 / n as f64
}

/// Render the background, write it as JPEG to `dest` and return its average brightness.
pub fn write_background(
    source: &Path,
    size: Size,
    style: &BackgroundStyle,
    dest: &Path,
) -> FramemarkResult<f64> {
    let img = render_background(source, size, style)?;
    let brightness = average_brightness(&img);
    let bytes = encode_jpeg(&DynamicImage::ImageRgba8(img), style.quality())?;
    std::fs::write(dest, bytes)
        .with_context(|| format!("write background '{}'", dest.display()))?;
    Ok(brightness)
}

#[cfg(test)]
#[path = "../../tests/unit/render/background.rs"]
mod tests;
