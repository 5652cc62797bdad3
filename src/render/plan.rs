use image::imageops::{self, FilterType};
use rayon::prelude::*;
use tracing::warn;

use crate::foundation::core::{Size, center_offset, clamp_offset, round_half_up, scale_dim};
use crate::render::composite::CompositeLayer;
use crate::render::fit::{FitMode, fit_to_bounds};
use crate::render::material::Material;
use crate::render::{LayerKind, LayerSource};

/// Text bitmaps wider than this (for a given background width) are narrowed before fitting.
pub fn max_text_width(bg_width: u32) -> u32 {
    bg_width.saturating_sub(40).max(10)
}

fn center_left(bg_width: u32, w: u32) -> i64 {
    i64::from(center_offset(bg_width, w))
}

fn clamp_top(top: f64, bg_height: u32, h: u32) -> i64 {
    let limit = i64::from(bg_height) - i64::from(h);
    i64::from(clamp_offset(round_half_up(top), limit))
}

fn stretch(source: &LayerSource, size: Size, kind: LayerKind) -> LayerSource {
    match source.decode() {
        Ok(img) if img.dimensions() == (size.width, size.height) => LayerSource::raster(img),
        Ok(img) if img.width() > 0 && img.height() > 0 => LayerSource::raster(imageops::resize(
            &img,
            size.width.max(1),
            size.height.max(1),
            FilterType::Triangle,
        )),
        Ok(_) => source.clone(),
        Err(err) => {
            warn!(layer = %kind, error = %err, "could not stretch layer, using it as-is");
            source.clone()
        }
    }
}

fn narrow_text(source: &LayerSource, max_w: u32) -> LayerSource {
    match source.decode() {
        Ok(img) if img.width() > max_w && img.height() > 0 => {
            let h = scale_dim(img.height(), f64::from(max_w) / f64::from(img.width()));
            LayerSource::raster(imageops::resize(&img, max_w, h, FilterType::Lanczos3))
        }
        Ok(_) => source.clone(),
        Err(err) => {
            warn!(error = %err, "could not narrow text layer");
            source.clone()
        }
    }
}

/// Build the ordered composite list: background, main photos, mask, then texts bottom-to-top.
///
/// Every layer goes through the fitting cascade; offsets are clamped so a layer of the
/// measured size stays on the background.
pub fn plan_layers(
    material: &Material,
    background: LayerSource,
    mask: LayerSource,
    mode: FitMode,
) -> Vec<CompositeLayer> {
    let bg = material.bg;
    let mut layers = Vec::with_capacity(2 + material.main.len() + material.text.len());

    layers.push(CompositeLayer {
        kind: LayerKind::Background,
        source: stretch(&background, bg, LayerKind::Background),
        left: 0,
        top: 0,
    });

    for main in &material.main {
        let fitted = fit_to_bounds(&main.source, bg, mode, "main");
        let w = if fitted.size.width > 0 {
            fitted.size.width
        } else {
            main.w
        };
        let h = if fitted.size.height > 0 {
            fitted.size.height
        } else {
            main.h
        };
        layers.push(CompositeLayer {
            kind: LayerKind::Main,
            source: fitted.source,
            left: center_left(bg.width, w),
            top: clamp_top(main.top as f64, bg.height, h),
        });
    }

    layers.push(CompositeLayer {
        kind: LayerKind::Mask,
        source: stretch(&mask, bg, LayerKind::Mask),
        left: 0,
        top: 0,
    });

    let max_w = max_text_width(bg.width);
    let mut prev_top: Option<i64> = None;
    for (index, text) in material.text.iter().enumerate().rev() {
        let input = if text.w > max_w {
            narrow_text(&text.source, max_w)
        } else {
            text.source.clone()
        };
        let fitted = fit_to_bounds(&input, bg, mode, "text");
        let w = if fitted.size.width > 0 {
            fitted.size.width
        } else {
            text.w.min(bg.width)
        };
        let h = if fitted.size.height > 0 {
            fitted.size.height
        } else {
            (round_half_up(text.h).max(0) as u32).min(bg.height)
        };

        let raw_top = match prev_top {
            None => f64::from(bg.height) - f64::from(h),
            Some(prev) => prev as f64 - f64::from(h),
        };
        let top = clamp_top(raw_top, bg.height, h);
        prev_top = Some(top);

        layers.push(CompositeLayer {
            kind: LayerKind::Text(index),
            source: fitted.source,
            left: center_left(bg.width, w),
            top,
        });
    }

    layers
}

/// Rescale a planned composite list onto an `out`-sized canvas.
///
/// Background and mask are stretched to `out`; every other layer is scaled by `scale` with
/// its offsets scaled and floored at zero. Layers that cannot be decoded are handed on
/// unchanged so the compositor can report them.
pub fn scale_layers(layers: &[CompositeLayer], scale: f64, out: Size) -> Vec<CompositeLayer> {
    layers
        .par_iter()
        .map(|layer| match layer.kind {
            LayerKind::Background | LayerKind::Mask => CompositeLayer {
                kind: layer.kind,
                source: stretch(&layer.source, out, layer.kind),
                left: 0,
                top: 0,
            },
            LayerKind::Main | LayerKind::Text(_) => {
                let source = match layer.source.decode() {
                    Ok(img) if img.width() > 0 && img.height() > 0 => {
                        let sw = scale_dim(img.width(), scale);
                        let sh = scale_dim(img.height(), scale);
                        if (sw, sh) == img.dimensions() {
                            LayerSource::raster(img)
                        } else {
                            LayerSource::raster(imageops::resize(
                                &img,
                                sw,
                                sh,
                                FilterType::Triangle,
                            ))
                        }
                    }
                    Ok(_) => layer.source.clone(),
                    Err(err) => {
                        warn!(layer = %layer.kind, error = %err, "could not scale layer");
                        layer.source.clone()
                    }
                };
                CompositeLayer {
                    kind: layer.kind,
                    source,
                    left: round_half_up(layer.left as f64 * scale).max(0),
                    top: round_half_up(layer.top as f64 * scale).max(0),
                }
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
