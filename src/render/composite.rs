use image::error::{ParameterError, ParameterErrorKind};
use image::{ImageError, Rgba, RgbaImage};
use rayon::prelude::*;

use crate::foundation::core::Size;
use crate::foundation::error::{FramemarkError, FramemarkResult};
use crate::foundation::math::{mul_div255_u8, unpremultiply_rgba8_in_place};
use crate::render::{LayerKind, LayerSource};

pub type PremulRgba8 = [u8; 4];

/// Porter-Duff source-over on premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(sa);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

fn premultiply(px: Rgba<u8>) -> PremulRgba8 {
    let [r, g, b, a] = px.0;
    let a16 = u16::from(a);
    [
        mul_div255_u8(u16::from(r), a16),
        mul_div255_u8(u16::from(g), a16),
        mul_div255_u8(u16::from(b), a16),
        a,
    ]
}

/// One positioned layer handed to the compositor.
#[derive(Clone, Debug)]
pub struct CompositeLayer {
    /// Role of the layer.
    pub kind: LayerKind,
    /// Pixels; decoded at composite time.
    pub source: LayerSource,
    /// Left offset on the canvas.
    pub left: i64,
    /// Top offset on the canvas.
    pub top: i64,
}

/// What is logged per layer when compositing fails for good.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerDiagnostic {
    /// Position in the composite list.
    pub index: usize,
    /// Role of the layer.
    pub kind: LayerKind,
    /// Measured size, `None` when the data could not be probed.
    pub size: Option<Size>,
    /// Declared left offset.
    pub left: i64,
    /// Declared top offset.
    pub top: i64,
}

fn new_canvas(size: Size, color: Rgba<u8>) -> FramemarkResult<RgbaImage> {
    if size.is_empty() {
        return Err(FramemarkError::validation(format!(
            "composite canvas must be non-empty, got {}x{}",
            size.width, size.height
        )));
    }
    Ok(RgbaImage::from_pixel(
        size.width,
        size.height,
        Rgba(premultiply(color)),
    ))
}

fn out_of_bounds(context: String) -> FramemarkError {
    FramemarkError::codec(
        context,
        ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        )),
    )
}

fn check_bounds(canvas: Size, layer: &CompositeLayer, img: &RgbaImage) -> FramemarkResult<()> {
    let right = layer.left + i64::from(img.width());
    let bottom = layer.top + i64::from(img.height());
    if layer.left < 0
        || layer.top < 0
        || right > i64::from(canvas.width)
        || bottom > i64::from(canvas.height)
    {
        return Err(out_of_bounds(format!(
            "{} layer {}x{} at ({}, {}) does not fit the {}x{} canvas",
            layer.kind,
            img.width(),
            img.height(),
            layer.left,
            layer.top,
            canvas.width,
            canvas.height
        )));
    }
    Ok(())
}

/// Blend straight-alpha `src` pixels over a premultiplied `dst` row of the same length.
pub fn over_row_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let px = premultiply(Rgba([s[0], s[1], s[2], s[3]]));
        let out = over([d[0], d[1], d[2], d[3]], px);
        d.copy_from_slice(&out);
    }
}

/// Blend a straight-alpha `layer` onto a premultiplied `canvas`, clipping to its bounds.
pub fn blend_clipped(canvas: &mut RgbaImage, layer: &RgbaImage, left: i64, top: i64) {
    let cw = i64::from(canvas.width());
    let ch = i64::from(canvas.height());
    let x0 = left.max(0);
    let y0 = top.max(0);
    let x1 = (left + i64::from(layer.width())).min(cw);
    let y1 = (top + i64::from(layer.height())).min(ch);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let canvas_stride = cw as usize * 4;
    let layer_stride = layer.width() as usize * 4;
    let dst_span = x0 as usize * 4..x1 as usize * 4;
    let src_x0 = (x0 - left) as usize * 4;
    let span_len = dst_span.len();
    let src = layer.as_raw();
    let dst: &mut [u8] = canvas;

    dst[y0 as usize * canvas_stride..y1 as usize * canvas_stride]
        .par_chunks_mut(canvas_stride)
        .enumerate()
        .for_each(|(i, row)| {
            let sy = (y0 - top) as usize + i;
            let start = sy * layer_stride + src_x0;
            over_row_in_place(&mut row[dst_span.clone()], &src[start..start + span_len]);
        });
}

fn finish(mut canvas: RgbaImage) -> RgbaImage {
    unpremultiply_rgba8_in_place(&mut canvas);
    canvas
}

/// Decode every layer up front and composite them in one pass.
///
/// Strict: any layer extending past the canvas fails the whole composite.
pub fn composite_batch(
    canvas: Size,
    color: Rgba<u8>,
    layers: &[CompositeLayer],
) -> FramemarkResult<RgbaImage> {
    let mut out = new_canvas(canvas, color)?;
    let decoded = layers
        .iter()
        .map(|l| l.source.decode())
        .collect::<FramemarkResult<Vec<_>>>()?;
    for (layer, img) in layers.iter().zip(&decoded) {
        check_bounds(canvas, layer, img)?;
    }
    for (layer, img) in layers.iter().zip(&decoded) {
        blend_clipped(&mut out, img, layer.left, layer.top);
    }
    Ok(finish(out))
}

/// Composite layers one at a time onto an intermediate canvas, clipping each.
pub fn composite_sequential(
    canvas: Size,
    color: Rgba<u8>,
    layers: &[CompositeLayer],
) -> FramemarkResult<RgbaImage> {
    let mut out = new_canvas(canvas, color)?;
    for layer in layers {
        let img = layer.source.decode()?;
        blend_clipped(&mut out, &img, layer.left, layer.top);
    }
    Ok(finish(out))
}

/// Batched composite, then sequential on failure.
///
/// When both fail the per-layer diagnostics are logged and the batch error is returned.
pub fn composite_with_fallback(
    canvas: Size,
    color: Rgba<u8>,
    layers: &[CompositeLayer],
) -> FramemarkResult<RgbaImage> {
    let batch_err = match composite_batch(canvas, color, layers) {
        Ok(img) => return Ok(img),
        Err(err) => err,
    };
    tracing::warn!(error = %batch_err, "batched composite failed, compositing sequentially");

    match composite_sequential(canvas, color, layers) {
        Ok(img) => Ok(img),
        Err(seq_err) => {
            tracing::error!(error = %seq_err, "sequential composite failed");
            log_diagnostics(canvas, layers);
            Err(batch_err)
        }
    }
}

/// Measure every layer for failure reports.
pub fn diagnostics(layers: &[CompositeLayer]) -> Vec<LayerDiagnostic> {
    layers
        .iter()
        .enumerate()
        .map(|(index, l)| LayerDiagnostic {
            index,
            kind: l.kind,
            size: l.source.probe().ok(),
            left: l.left,
            top: l.top,
        })
        .collect()
}

/// Log [`diagnostics`] at error level.
pub fn log_diagnostics(canvas: Size, layers: &[CompositeLayer]) {
    tracing::error!(
        width = canvas.width,
        height = canvas.height,
        layers = layers.len(),
        "composite failed"
    );
    for d in diagnostics(layers) {
        tracing::error!(
            index = d.index,
            kind = %d.kind,
            size = ?d.size.map(|s| (s.width, s.height)),
            left = d.left,
            top = d.top,
            "composite layer"
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
