//! Hex color parsing for highlight annotations
//!
//! Colors arrive from users as `#RRGGBB` strings. Anything that is not
//! exactly six hex digits silently becomes yellow, so a typo in a color
//! never aborts a highlight run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Color used when the input cannot be parsed
pub const DEFAULT_HEX: &str = "#ffff00";

/// Normalized RGB color, each channel in `[0.0, 1.0]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const YELLOW: Rgb = Rgb {
        r: 1.0,
        g: 1.0,
        b: 0.0,
    };

    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Channels as PDF reals, in `/C` array order
    pub fn to_pdf_components(&self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }

    /// Render as `#rrggbb`
    pub fn to_hex(&self) -> String {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::YELLOW
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Parse a hex color string ("#FF0000" or "FF0000") into normalized RGB.
///
/// Never fails: malformed input yields [`Rgb::YELLOW`].
pub fn hex_to_rgb(hex: &str) -> Rgb {
    let trimmed = hex.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Rgb::YELLOW;
    }

    let channel = |range: std::ops::Range<usize>| match u8::from_str_radix(&digits[range], 16) {
        Ok(v) => Some(v as f64 / 255.0),
        Err(_) => None,
    };

    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => Rgb { r, g, b },
        _ => Rgb::YELLOW,
    }
}

/// Normalize a user-supplied color so it carries a leading `#`.
///
/// An empty value becomes [`DEFAULT_HEX`]. The result is not validated;
/// [`hex_to_rgb`] applies the fallback later.
pub fn normalize_hex(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return DEFAULT_HEX.to_string();
    }
    if trimmed.starts_with('#') {
        trimmed.to_string()
    } else {
        format!("#{}", trimmed)
    }
}
