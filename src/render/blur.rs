use image::RgbaImage;
use rayon::prelude::*;

use crate::foundation::error::{FramemarkError, FramemarkResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};

/// Separable Gaussian over premultiplied RGBA8 with clamp-to-edge sampling.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> FramemarkResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| FramemarkError::validation("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(FramemarkError::validation(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if radius == 0 || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

/// Blur a straight-alpha image, premultiplying around the convolution.
pub fn blur_image(img: &RgbaImage, radius: u32, sigma: f32) -> FramemarkResult<RgbaImage> {
    let (w, h) = img.dimensions();
    let mut premul = img.as_raw().clone();
    premultiply_rgba8_in_place(&mut premul);
    let mut out = blur_rgba8_premul(&premul, w, h, radius, sigma)?;
    unpremultiply_rgba8_in_place(&mut out);
    RgbaImage::from_raw(w, h, out)
        .ok_or_else(|| FramemarkError::validation("blurred buffer does not match image size"))
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> FramemarkResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FramemarkError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(FramemarkError::validation("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(width);
    let stride = width as usize * 4;
    dst.par_chunks_mut(stride)
        .zip(src.par_chunks(stride))
        .for_each(|(out_row, row)| {
            for x in 0..w {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sx = (x + ki as i64 - radius).clamp(0, w - 1) as usize * 4;
                    for c in 0..4 {
                        acc[c] += u64::from(kw) * u64::from(row[sx + c]);
                    }
                }
                let o = x as usize * 4;
                for c in 0..4 {
                    out_row[o + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let h = i64::from(height);
    let stride = width as usize * 4;
    dst.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, out_row)| {
            for x in 0..width as usize {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sy = (y as i64 + ki as i64 - radius).clamp(0, h - 1) as usize;
                    let idx = sy * stride + x * 4;
                    for c in 0..4 {
                        acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                    }
                }
                for c in 0..4 {
                    out_row[x * 4 + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
