use std::io::{BufRead, Cursor, Seek};
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageError, ImageFormat, ImageReader, RgbaImage};

use crate::foundation::core::Size;
use crate::foundation::error::{FramemarkError, FramemarkResult};

fn orientation_swaps_axes(o: Orientation) -> bool {
    matches!(
        o,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

fn probe_reader<R: BufRead + Seek>(reader: ImageReader<R>) -> Result<Size, ImageError> {
    let reader = reader.with_guessed_format().map_err(ImageError::IoError)?;
    let mut decoder = reader.into_decoder()?;
    let (w, h) = decoder.dimensions();
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    if orientation_swaps_axes(orientation) {
        Ok(Size::new(h, w))
    } else {
        Ok(Size::new(w, h))
    }
}

fn decode_reader<R: BufRead + Seek>(reader: ImageReader<R>) -> Result<DynamicImage, ImageError> {
    let reader = reader.with_guessed_format().map_err(ImageError::IoError)?;
    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Read the orientation-corrected pixel size of an image file without decoding pixels.
pub fn probe_path(path: &Path) -> FramemarkResult<Size> {
    let reader = ImageReader::open(path).map_err(|e| {
        FramemarkError::codec(format!("open '{}'", path.display()), ImageError::IoError(e))
    })?;
    probe_reader(reader)
        .map_err(|e| FramemarkError::codec(format!("probe '{}'", path.display()), e))
}

/// Read the orientation-corrected pixel size of encoded image bytes.
pub fn probe_bytes(bytes: &[u8]) -> FramemarkResult<Size> {
    probe_reader(ImageReader::new(Cursor::new(bytes)))
        .map_err(|e| FramemarkError::codec("probe image bytes", e))
}

/// Decode an image file and apply its EXIF orientation.
pub fn open_oriented(path: &Path) -> FramemarkResult<DynamicImage> {
    let reader = ImageReader::open(path).map_err(|e| {
        FramemarkError::codec(format!("open '{}'", path.display()), ImageError::IoError(e))
    })?;
    decode_reader(reader)
        .map_err(|e| FramemarkError::codec(format!("decode '{}'", path.display()), e))
}

/// Decode encoded image bytes and apply their EXIF orientation.
pub fn decode_oriented(bytes: &[u8]) -> FramemarkResult<DynamicImage> {
    decode_reader(ImageReader::new(Cursor::new(bytes)))
        .map_err(|e| FramemarkError::codec("decode image bytes", e))
}

/// Encode an image as baseline JPEG at `quality` (clamped to 1..=100). Alpha is dropped.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> FramemarkResult<Vec<u8>> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder
        .encode_image(&rgb)
        .map_err(|e| FramemarkError::codec("encode jpeg", e))?;
    Ok(buf)
}

/// Encode an RGBA image as PNG.
pub fn encode_png(img: &RgbaImage) -> FramemarkResult<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| FramemarkError::codec("encode png", e))?;
    Ok(buf)
}

/// Extract the payload of a `data:<mime>;base64,<payload>` URL.
pub fn decode_data_url(url: &str) -> FramemarkResult<Vec<u8>> {
    let (_, payload) = url
        .split_once(',')
        .ok_or_else(|| FramemarkError::validation("data url is missing its ',' separator"))?;
    STANDARD
        .decode(payload.trim())
        .map_err(|e| FramemarkError::validation(format!("data url payload is not base64: {e}")))
}

/// Wrap PNG bytes in a `data:image/png;base64,` URL.
pub fn png_data_url(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
