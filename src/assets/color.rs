use image::Rgba;
use tracing::warn;

use crate::foundation::error::{FramemarkError, FramemarkResult};

/// Opaque white, the default canvas and solid-background color.
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (the `#` is optional) into straight-alpha RGBA8.
pub fn parse_hex_color(s: &str) -> FramemarkResult<Rgba<u8>> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if !s.is_ascii() {
        return Err(FramemarkError::validation("hex color must be ASCII"));
    }

    fn hex_byte(pair: &str) -> FramemarkResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| FramemarkError::validation(format!("invalid hex byte \"{pair}\"")))
    }

    let (r, g, b, a) = match s.len() {
        3 => {
            let r = hex_byte(&s[0..1])?;
            let g = hex_byte(&s[1..2])?;
            let b = hex_byte(&s[2..3])?;
            (r * 17, g * 17, b * 17, 255)
        }
        6 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            255,
        ),
        8 => (
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        ),
        _ => {
            return Err(FramemarkError::validation(
                "hex color must be #RGB, #RRGGBB or #RRGGBBAA",
            ));
        }
    };

    Ok(Rgba([r, g, b, a]))
}

/// Resolve an optional configured color, falling back to white on absence or parse failure.
pub fn color_or_white(color: Option<&str>) -> Rgba<u8> {
    match color {
        None => WHITE,
        Some(s) if s.trim().is_empty() => WHITE,
        Some(s) => parse_hex_color(s).unwrap_or_else(|e| {
            warn!("ignoring solid color {s:?}: {e}");
            WHITE
        }),
    }
}
