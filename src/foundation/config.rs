use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::foundation::error::{FramemarkError, FramemarkResult};

/// Target background aspect ratio, expressed as a `w:h` pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BgRate {
    /// Width component of the ratio.
    #[serde(default, deserialize_with = "number_or_string")]
    pub w: f64,
    /// Height component of the ratio.
    #[serde(default, deserialize_with = "number_or_string")]
    pub h: f64,
}

impl BgRate {
    /// Create a ratio from its components.
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    /// `w / h` when both components are positive and finite.
    pub fn ratio(self) -> Option<f64> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        (valid(self.w) && valid(self.h)).then(|| self.w / self.h)
    }
}

/// Layout and output options for one watermark job.
///
/// Field names follow the wire format shared with the external renderer, which receives these
/// options verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Whether `bg_rate` reshapes the background.
    pub bg_rate_show: bool,
    /// Target background aspect ratio.
    pub bg_rate: BgRate,
    /// Force a landscape background.
    pub landscape: bool,
    /// Maximum share (percent) of the background width the main photo may occupy.
    pub main_img_w_rate: Option<f64>,
    /// Minimum top/bottom margin around the main photo, as a percent of background height.
    pub mini_top_bottom_margin: f64,
    /// Whether the drop shadow is drawn.
    pub shadow_show: bool,
    /// Shadow extent as a percent of the main photo height.
    pub shadow: f64,
    /// Whether the photo hole gets rounded corners.
    pub radius_show: bool,
    /// Corner radius as a percent of the main photo height.
    pub radius: Option<f64>,
    /// Use a solid background instead of a blurred copy of the photo.
    pub solid_bg: bool,
    /// Solid background color (`#RGB`, `#RRGGBB` or `#RRGGBBAA`).
    pub solid_color: Option<String>,
    /// Export JPEG quality (1..=100).
    pub quality: Option<u8>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            bg_rate_show: false,
            bg_rate: BgRate::default(),
            landscape: false,
            main_img_w_rate: Some(90.0),
            mini_top_bottom_margin: 0.0,
            shadow_show: false,
            shadow: 0.0,
            radius_show: false,
            radius: None,
            solid_bg: false,
            solid_color: None,
            quality: Some(100),
        }
    }
}

impl LayoutOptions {
    /// Fraction (0..1] of the background width the main photo may occupy.
    pub fn main_width_fraction(&self) -> f64 {
        match self.main_img_w_rate {
            Some(v) if v.is_finite() && v > 0.0 => v / 100.0,
            _ => 0.9,
        }
    }

    /// Shadow blur strength in percent of the main photo height used by the mask renderer.
    /// Unset or non-positive values fall back to 6.
    pub fn shadow_strength(&self) -> f64 {
        if self.shadow.is_finite() && self.shadow > 0.0 {
            self.shadow
        } else {
            6.0
        }
    }

    /// Corner radius in pixels of the photo hole, zero unless `radius_show`.
    pub fn corner_radius(&self, main_height: u32) -> f64 {
        if !self.radius_show {
            return 0.0;
        }
        let pct = match self.radius {
            Some(v) if v.is_finite() && v >= 0.0 => v,
            _ => 2.1,
        };
        f64::from(main_height) * pct / 100.0
    }

    /// Export quality, defaulting to 100.
    pub fn export_quality(&self) -> u8 {
        match self.quality {
            Some(q) if q > 0 => q.min(100),
            _ => 100,
        }
    }
}

/// Application-level configuration, loaded from JSON and passed explicitly into jobs.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Layout options applied to every job.
    pub options: LayoutOptions,
    /// Directory that receives final composites.
    pub output: PathBuf,
    /// Directory for per-job cache files.
    pub cache_dir: PathBuf,
    /// Built-in template fields, forwarded to the text renderer in order.
    pub temp_fields: Vec<serde_json::Value>,
    /// User-defined template fields, appended after the built-in ones.
    pub custom_temp_fields: Vec<serde_json::Value>,
    /// Template definitions, forwarded verbatim.
    pub temps: serde_json::Value,
    /// Optional logo path handed to the text renderer.
    pub logo: Option<PathBuf>,
}

impl AppConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FramemarkResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| FramemarkError::validation(format!("parse config JSON: {e}")))
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> FramemarkResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FramemarkError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Template fields in renderer order: built-in first, then custom.
    pub fn all_fields(&self) -> Vec<serde_json::Value> {
        self.temp_fields
            .iter()
            .chain(&self.custom_temp_fields)
            .cloned()
            .collect()
    }
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(f64),
        Str(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Num(v) => Ok(v),
        Repr::Str(s) if s.trim().is_empty() => Ok(0.0),
        Repr::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid number \"{s}\""))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
