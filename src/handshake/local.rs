use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tokio::task::JoinHandle;

use crate::assets::decode::{encode_png, png_data_url};
use crate::foundation::config::LayoutOptions;
use crate::foundation::core::{Size, ceil_dim, clamp_offset};
use crate::foundation::error::FramemarkResult;
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};
use crate::handshake::bus::RendererEndpoint;
use crate::handshake::protocol::{
    RenderRequest, RenderResponse, ShadowRequest, ShadowResponse, TextResponse,
};
use crate::render::blur::blur_image;
use crate::render::composite::blend_clipped;
use crate::render::material::{LayerGeometry, MaterialSnapshot};

/// Longest side the shadow is blurred at before being stretched to the background.
const SHADOW_WORKING_MAX: u32 = 512;

/// Silhouette color before blurring.
const SHADOW_COLOR: Rgba<u8> = Rgba([0, 0, 0, 140]);

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// In-process renderer: no text, plus a generated drop-shadow mask.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalRenderer;

impl LocalRenderer {
    /// Serve `endpoint` until every bus handle is dropped.
    pub fn spawn(self, mut endpoint: RendererEndpoint) -> JoinHandle<()> {
        tokio::spawn(async move {
            let responder = endpoint.responder();
            while let Some(req) = endpoint.recv().await {
                let id = req.id().to_string();
                let answered = tokio::task::spawn_blocking(move || self.answer(&req)).await;
                match answered {
                    Ok(Ok(resp)) => {
                        if !responder.respond(resp) {
                            tracing::debug!(id, "local renderer answer arrived too late");
                        }
                    }
                    Ok(Err(err)) => tracing::error!(id, error = %err, "local renderer failed"),
                    Err(err) => tracing::error!(id, error = %err, "local renderer task panicked"),
                }
            }
        })
    }

    /// Produce the response for one request.
    pub fn answer(&self, req: &RenderRequest) -> FramemarkResult<RenderResponse> {
        match req {
            RenderRequest::GenTextImg(r) => Ok(RenderResponse::GenTextImg(TextResponse {
                id: r.id.clone(),
                text_img_list: Vec::new(),
            })),
            RenderRequest::GenMainImgShadow(r) => {
                Ok(RenderResponse::GenMainImgShadow(self.shadow(r)?))
            }
        }
    }

    fn shadow(&self, req: &ShadowRequest) -> FramemarkResult<ShadowResponse> {
        let mask = shadow_mask(&req.material, &req.options, req.bg_brightness)?;
        Ok(ShadowResponse {
            id: req.id.clone(),
            data: png_data_url(&encode_png(&mask)?),
        })
    }
}

/// Alpha of the whole-background overlay drawn over a blurred background (20%).
const OVERLAY_ALPHA: u8 = 51;

/// Overlay tint for a background of the given average brightness; very dark backgrounds get
/// a lighter grey.
pub fn overlay_tint(brightness: f64) -> Rgba<u8> {
    let grey = if brightness < 15.0 {
        180
    } else if brightness < 20.0 {
        158
    } else if brightness < 40.0 {
        128
    } else {
        0
    };
    Rgba([grey, grey, grey, OVERLAY_ALPHA])
}

/// Paint the rounded rectangle of `m` (scaled by `scale`), sampling pixel centers.
fn fill_round_rect(
    img: &mut RgbaImage,
    m: &LayerGeometry,
    scale: f64,
    radius: f64,
    color: Rgba<u8>,
) {
    let (left, top) = (m.left as f64 * scale, m.top as f64 * scale);
    let (w, h) = (f64::from(m.w) * scale, f64::from(m.h) * scale);
    let (right, bottom) = (left + w, top + h);
    let r = (radius * scale).clamp(0.0, w.min(h) / 2.0);

    let (iw, ih) = (i64::from(img.width()), i64::from(img.height()));
    let (x0, x1) = (clamp_offset(left.floor() as i64, iw), clamp_offset(right.ceil() as i64, iw));
    let (y0, y1) = (clamp_offset(top.floor() as i64, ih), clamp_offset(bottom.ceil() as i64, ih));
    for y in y0..y1 {
        let cy = f64::from(y) + 0.5;
        if cy < top || cy > bottom {
            continue;
        }
        let dy = (top + r - cy).max(cy - (bottom - r)).max(0.0);
        for x in x0..x1 {
            let cx = f64::from(x) + 0.5;
            if cx < left || cx > right {
                continue;
            }
            let dx = (left + r - cx).max(cx - (right - r)).max(0.0);
            if dx * dx + dy * dy <= r * r {
                img.put_pixel(x, y, color);
            }
        }
    }
}

/// Blurred dark silhouette of every main photo, stretched to `bg`.
fn silhouette_shadow(
    material: &MaterialSnapshot,
    opts: &LayoutOptions,
    bg: Size,
) -> FramemarkResult<RgbaImage> {
    let scale = (f64::from(SHADOW_WORKING_MAX) / f64::from(bg.max_side())).min(1.0);
    let small = bg.scaled(scale);
    let mut silhouette = RgbaImage::from_pixel(small.width, small.height, CLEAR);
    let mut radius = 1;
    for m in &material.main {
        fill_round_rect(&mut silhouette, m, scale, opts.corner_radius(m.h), SHADOW_COLOR);
        radius = radius.max(ceil_dim(f64::from(m.h) * opts.shadow_strength() / 100.0 * scale));
    }

    let blurred = blur_image(&silhouette, radius, radius as f32 / 2.0)?;
    Ok(if small == bg {
        blurred
    } else {
        imageops::resize(&blurred, bg.width, bg.height, FilterType::Triangle)
    })
}

/// Background-sized mask drawn over the background and main photo.
///
/// Layers, bottom to top: a 20% brightness-keyed overlay when the background is blurred (and
/// `bg_brightness` is known), then the blurred drop shadow when `shadow_show` is on. A
/// rounded-corner hole is cut over each main photo so the photo shows through.
pub fn shadow_mask(
    material: &MaterialSnapshot,
    opts: &LayoutOptions,
    bg_brightness: Option<f64>,
) -> FramemarkResult<RgbaImage> {
    let bg = Size::new(material.bg.width.max(1), material.bg.height.max(1));
    let overlay = match bg_brightness {
        Some(b) if !opts.solid_bg => overlay_tint(b),
        _ => CLEAR,
    };
    let mut mask = RgbaImage::from_pixel(bg.width, bg.height, overlay);
    if material.main.is_empty() {
        return Ok(mask);
    }

    if opts.shadow_show {
        let shade = silhouette_shadow(material, opts, bg)?;
        premultiply_rgba8_in_place(&mut mask);
        blend_clipped(&mut mask, &shade, 0, 0);
        unpremultiply_rgba8_in_place(&mut mask);
    }
    for m in &material.main {
        fill_round_rect(&mut mask, m, 1.0, opts.corner_radius(m.h), CLEAR);
    }
    Ok(mask)
}

#[cfg(test)]
#[path = "../../tests/unit/handshake/local.rs"]
mod tests;
