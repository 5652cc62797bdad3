use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;

use crate::assets::decode::{decode_oriented, open_oriented, probe_bytes, probe_path};
use crate::foundation::core::Size;
use crate::foundation::error::FramemarkResult;

pub mod background;
pub mod blur;
pub mod composite;
pub mod fit;
pub mod material;
pub mod plan;

/// Where a layer's pixels come from.
#[derive(Clone)]
pub enum LayerSource {
    /// Encoded image file on disk.
    Path(PathBuf),
    /// Encoded image bytes (PNG/JPEG/...).
    Encoded(Arc<Vec<u8>>),
    /// Already decoded straight-alpha pixels.
    Raster(Arc<RgbaImage>),
}

impl LayerSource {
    /// Wrap encoded bytes.
    pub fn encoded(bytes: Vec<u8>) -> Self {
        Self::Encoded(Arc::new(bytes))
    }

    /// Wrap decoded pixels.
    pub fn raster(img: RgbaImage) -> Self {
        Self::Raster(Arc::new(img))
    }

    /// Orientation-corrected pixel size, without decoding when possible.
    pub fn probe(&self) -> FramemarkResult<Size> {
        match self {
            Self::Path(p) => probe_path(p),
            Self::Encoded(b) => probe_bytes(b),
            Self::Raster(img) => Ok(Size::new(img.width(), img.height())),
        }
    }

    /// Decode into straight-alpha RGBA8 with EXIF orientation applied.
    pub fn decode(&self) -> FramemarkResult<RgbaImage> {
        match self {
            Self::Path(p) => Ok(open_oriented(p)?.into_rgba8()),
            Self::Encoded(b) => Ok(decode_oriented(b)?.into_rgba8()),
            Self::Raster(img) => Ok(img.as_ref().clone()),
        }
    }
}

impl fmt::Debug for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Self::Encoded(b) => f.debug_tuple("Encoded").field(&b.len()).finish(),
            Self::Raster(img) => f
                .debug_tuple("Raster")
                .field(&(img.width(), img.height()))
                .finish(),
        }
    }
}

/// Role of a layer in the fixed composite order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    /// Blurred or solid background.
    Background,
    /// The photo itself.
    Main,
    /// Shadow cutout mask, always stretched to the canvas.
    Mask,
    /// One text bitmap; the index is its authored position.
    Text(usize),
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Background => f.write_str("background"),
            Self::Main => f.write_str("main"),
            Self::Mask => f.write_str("mask"),
            Self::Text(i) => write!(f, "text[{i}]"),
        }
    }
}
