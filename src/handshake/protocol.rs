use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::assets::decode::decode_data_url;
use crate::assets::metadata::MetadataBag;
use crate::foundation::config::LayoutOptions;
use crate::foundation::error::FramemarkResult;
use crate::render::material::MaterialSnapshot;

/// Ask the renderer for the text bitmaps of one photo.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRequest {
    pub id: String,
    pub exif: MetadataBag,
    pub bg_height: u32,
    pub options: LayoutOptions,
    pub fields: Vec<serde_json::Value>,
    pub temps: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<PathBuf>,
}

/// One rendered text bitmap as a base64 data URL.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextImage {
    pub data: String,
    pub w: u32,
    pub h: u32,
}

impl TextImage {
    /// Decoded image bytes.
    pub fn bytes(&self) -> FramemarkResult<Vec<u8>> {
        decode_data_url(&self.data)
    }
}

/// Text bitmaps in authored order; the last one is drawn closest to the bottom.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextResponse {
    pub id: String,
    #[serde(default)]
    pub text_img_list: Vec<TextImage>,
}

/// Ask the renderer for the shadow cutout mask of a laid-out job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShadowRequest {
    pub id: String,
    pub material: MaterialSnapshot,
    pub options: LayoutOptions,
    /// Average brightness of a blurred background; tints the overlay. Absent for solid fills.
    #[serde(default, rename = "bgBrightness", skip_serializing_if = "Option::is_none")]
    pub bg_brightness: Option<f64>,
}

/// Shadow mask as a base64 data URL.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShadowResponse {
    pub id: String,
    pub data: String,
}

impl ShadowResponse {
    /// Decoded mask bytes.
    pub fn bytes(&self) -> FramemarkResult<Vec<u8>> {
        decode_data_url(&self.data)
    }
}

/// Outbound message, tagged with the channel name the renderer listens on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload")]
pub enum RenderRequest {
    #[serde(rename = "genTextImg")]
    GenTextImg(TextRequest),
    #[serde(rename = "genMainImgShadow")]
    GenMainImgShadow(ShadowRequest),
}

impl RenderRequest {
    /// Correlation id of the request.
    pub fn id(&self) -> &str {
        match self {
            Self::GenTextImg(r) => &r.id,
            Self::GenMainImgShadow(r) => &r.id,
        }
    }
}

/// Inbound message from the renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload")]
pub enum RenderResponse {
    #[serde(rename = "genTextImg")]
    GenTextImg(TextResponse),
    #[serde(rename = "genMainImgShadow")]
    GenMainImgShadow(ShadowResponse),
}

#[cfg(test)]
#[path = "../../tests/unit/handshake/protocol.rs"]
mod tests;
