//! Color utility functions shared across the crate.
//!
//! The external color map uses CSS hex strings (`#RRGGBB`), the render model
//! uses RGBA byte arrays.

use crate::constants::DEFAULT_CATEGORY_COLOR;

/// An RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// Opaque color from RGB channels.
    pub fn opaque(rgb: [u8; 3]) -> Self {
        Self([rgb[0], rgb[1], rgb[2], 0xFF])
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, alpha: u8) -> Self {
        let [r, g, b, _] = self.0;
        Self([r, g, b, alpha])
    }

    /// CSS hex form, `#RRGGBB` when opaque and `#RRGGBBAA` otherwise.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.0;
        if a == 0xFF {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

/// Parse a `#RGB` or `#RRGGBB` hex color (leading `#` optional).
///
/// Returns None for anything else, including named CSS colors.
pub fn parse_hex_rgb(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some([r, g, b])
        }
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, digit) in rgb.iter_mut().zip(hex.chars()) {
                let v = digit.to_digit(16)? as u8;
                *slot = v * 16 + v;
            }
            Some(rgb)
        }
        _ => None,
    }
}

/// Parse a hex color, falling back to the default category color.
pub fn parse_or_default(value: Option<&str>) -> [u8; 3] {
    match value.and_then(parse_hex_rgb) {
        Some(rgb) => rgb,
        None => {
            if let Some(raw) = value {
                log::debug!("Unparseable color '{}', using default", raw);
            }
            DEFAULT_CATEGORY_COLOR
        }
    }
}
