use std::path::PathBuf;

use crate::foundation::config::{AppConfig, LayoutOptions};

/// Default longest preview side.
pub const DEFAULT_PREVIEW_MAX_SIZE: u32 = 1100;
/// Smallest accepted preview side.
pub const MIN_PREVIEW_MAX_SIZE: u32 = 200;
/// Default preview JPEG quality.
pub const DEFAULT_PREVIEW_QUALITY: u8 = 80;

/// Everything one job needs besides the renderer.
#[derive(Clone, Debug, Default)]
pub struct JobOptions {
    /// Directory for `<id>_*` cache files.
    pub cache_dir: PathBuf,
    /// Directory that receives the final composite.
    pub output_dir: PathBuf,
    pub layout: LayoutOptions,
    /// Template fields forwarded to the text renderer.
    pub fields: Vec<serde_json::Value>,
    /// Template definitions forwarded to the text renderer.
    pub temps: serde_json::Value,
    pub logo: Option<PathBuf>,
}

impl JobOptions {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            cache_dir: cfg.cache_dir.clone(),
            output_dir: cfg.output.clone(),
            layout: cfg.options.clone(),
            fields: cfg.all_fields(),
            temps: cfg.temps.clone(),
            logo: cfg.logo.clone(),
        }
    }
}

/// Caller-facing preview knobs; see [`PreviewOptions::normalized`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreviewOptions {
    pub max_size: Option<u32>,
    pub quality: Option<u8>,
}

impl PreviewOptions {
    /// `(max_size, quality)` with defaults applied; zero counts as unset.
    pub fn normalized(self) -> (u32, u8) {
        let max_size = match self.max_size {
            Some(v) if v > 0 => v,
            _ => DEFAULT_PREVIEW_MAX_SIZE,
        };
        let quality = match self.quality {
            Some(q) if q > 0 => q,
            _ => DEFAULT_PREVIEW_QUALITY,
        };
        (max_size.max(MIN_PREVIEW_MAX_SIZE), quality.clamp(30, 100))
    }
}
