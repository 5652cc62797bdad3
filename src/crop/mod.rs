//! Aspect-ratio crop and vertical slicing for grid-style posts.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{FramemarkError, FramemarkResult};

pub mod split;

pub use split::{center_crop_rect, clamp_crop_rect, crop_split, resolve_crop, slice_spans};

/// Default JPEG quality of written slices.
pub const DEFAULT_CROP_QUALITY: u8 = 92;

/// Named target ratio and slice count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropMode {
    /// 3:2 crop split into two 3:4 halves.
    #[serde(rename = "two_3x4")]
    Two3x4,
    /// 9:5 crop split into three 3:5 thirds.
    #[serde(rename = "three_3x5")]
    Three3x5,
    /// Caller-supplied ratio and slice count.
    #[serde(rename = "custom")]
    Custom,
}

impl CropMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Two3x4 => "two_3x4",
            Self::Three3x5 => "three_3x5",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for CropMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CropMode {
    type Err = FramemarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "two_3x4" => Ok(Self::Two3x4),
            "three_3x5" => Ok(Self::Three3x5),
            "custom" => Ok(Self::Custom),
            other => Err(FramemarkError::validation(format!(
                "unknown crop mode \"{other}\" (expected two_3x4, three_3x5 or custom)"
            ))),
        }
    }
}

/// Resolved crop ratio `crop_w:crop_h` and slice count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropModeDef {
    pub crop_w: f64,
    pub crop_h: f64,
    pub parts: u32,
}

impl CropModeDef {
    pub const TWO_3X4: Self = Self {
        crop_w: 3.0,
        crop_h: 2.0,
        parts: 2,
    };

    pub const THREE_3X5: Self = Self {
        crop_w: 9.0,
        crop_h: 5.0,
        parts: 3,
    };

    /// Validate caller values for [`CropMode::Custom`].
    pub fn custom(
        crop_w: Option<f64>,
        crop_h: Option<f64>,
        parts: Option<u32>,
    ) -> FramemarkResult<Self> {
        let positive = |v: Option<f64>| v.filter(|v| v.is_finite() && *v > 0.0);
        let crop_w =
            positive(crop_w).ok_or_else(|| FramemarkError::validation("cropW is invalid"))?;
        let crop_h =
            positive(crop_h).ok_or_else(|| FramemarkError::validation("cropH is invalid"))?;
        let parts = parts
            .filter(|p| matches!(p, 2 | 3))
            .ok_or_else(|| FramemarkError::validation("parts must be 2 or 3"))?;
        Ok(Self {
            crop_w,
            crop_h,
            parts,
        })
    }

    pub fn ratio(&self) -> f64 {
        self.crop_w / self.crop_h
    }
}

/// Requested crop rectangle, possibly fractional or out of bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropRectInput {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// One crop-and-split call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropSplitRequest {
    pub path: PathBuf,
    pub output_dir: PathBuf,
    pub mode: CropMode,
    #[serde(default)]
    pub crop_w: Option<f64>,
    #[serde(default)]
    pub crop_h: Option<f64>,
    #[serde(default)]
    pub parts: Option<u32>,
    #[serde(default)]
    pub crop_rect: Option<CropRectInput>,
    #[serde(default)]
    pub quality: Option<u8>,
}

impl CropSplitRequest {
    pub fn new(path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, mode: CropMode) -> Self {
        Self {
            path: path.into(),
            output_dir: output_dir.into(),
            mode,
            crop_w: None,
            crop_h: None,
            parts: None,
            crop_rect: None,
            quality: None,
        }
    }

    /// The fixed definition of a built-in mode, or the validated custom one.
    pub fn mode_def(&self) -> FramemarkResult<CropModeDef> {
        match self.mode {
            CropMode::Two3x4 => Ok(CropModeDef::TWO_3X4),
            CropMode::Three3x5 => Ok(CropModeDef::THREE_3X5),
            CropMode::Custom => CropModeDef::custom(self.crop_w, self.crop_h, self.parts),
        }
    }

    /// JPEG quality for the slices.
    pub fn quality(&self) -> u8 {
        self.quality.unwrap_or(DEFAULT_CROP_QUALITY).clamp(1, 100)
    }
}
