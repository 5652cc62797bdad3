use serde::{Deserialize, Serialize};

use crate::foundation::core::Size;
use crate::render::LayerSource;

/// The photo layer with its computed placement.
#[derive(Clone, Debug)]
pub struct MainLayer {
    /// Cached, orientation-corrected photo.
    pub source: LayerSource,
    /// Declared width.
    pub w: u32,
    /// Declared height.
    pub h: u32,
    /// Top offset on the background.
    pub top: i64,
    /// Left offset on the background.
    pub left: i64,
}

/// One rendered text bitmap.
#[derive(Clone, Debug)]
pub struct TextLayer {
    /// Encoded bitmap (PNG in practice).
    pub source: LayerSource,
    /// Declared width.
    pub w: u32,
    /// Declared height; the bottommost layer also carries the bottom text padding.
    pub h: f64,
}

/// All layers of one job and their geometry.
///
/// The last text item sits closest to the bottom edge.
#[derive(Clone, Debug, Default)]
pub struct Material {
    pub bg: Size,
    pub main: Vec<MainLayer>,
    pub text: Vec<TextLayer>,
}

impl Material {
    /// Declared heights of the text stack in authored order.
    pub fn text_heights(&self) -> Vec<f64> {
        self.text.iter().map(|t| t.h).collect()
    }

    /// Geometry-only view sent to the shadow renderer.
    pub fn snapshot(&self) -> MaterialSnapshot {
        MaterialSnapshot {
            bg: self.bg,
            main: self
                .main
                .iter()
                .map(|m| LayerGeometry {
                    w: m.w,
                    h: m.h,
                    top: m.top,
                    left: m.left,
                })
                .collect(),
            text: self
                .text
                .iter()
                .map(|t| TextGeometry { w: t.w, h: t.h })
                .collect(),
        }
    }
}

/// Wire form of [`Material`] without pixel data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialSnapshot {
    pub bg: Size,
    pub main: Vec<LayerGeometry>,
    pub text: Vec<TextGeometry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerGeometry {
    pub w: u32,
    pub h: u32,
    pub top: i64,
    pub left: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextGeometry {
    pub w: u32,
    pub h: f64,
}
