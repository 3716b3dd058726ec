//! Color and number normalization.
//!
//! These are the leaf functions of the sanitizer: each one turns arbitrary,
//! possibly hostile input into a valid value or reports that it could not.

use std::fmt;
use std::str::FromStr;

use palette::{LinSrgb, Srgb};
use serde::{Serialize, Serializer};
use serde_json::Value;

// ============================================================================
// HexColor
// ============================================================================

/// An uppercase, six-digit hex color with a leading `#` (e.g. `#2B8EFB`).
///
/// The only way to obtain one is through [`normalize_hex`] (or `FromStr`,
/// which delegates to it), so every instance is well formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexColor(String);

impl HexColor {
    pub const WHITE: &'static str = "#FFFFFF";
    pub const BLACK: &'static str = "#000000";

    pub fn white() -> Self {
        Self(Self::WHITE.to_string())
    }

    pub fn black() -> Self {
        Self(Self::BLACK.to_string())
    }

    /// Builds a color from a 24-bit RGB value.
    pub fn from_rgb_u32(rgb: u32) -> Self {
        Self(format!("#{:06X}", rgb & 0x00FF_FFFF))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the red, green and blue channels.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let channel = |i: usize| u8::from_str_radix(&self.0[i..i + 2], 16).unwrap_or(0);
        (channel(1), channel(3), channel(5))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HexColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Error returned when parsing a string that is not a hex color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a 3- or 6-digit hex color")]
pub struct InvalidHexColor(pub String);

impl FromStr for HexColor {
    type Err = InvalidHexColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_hex(s).ok_or_else(|| InvalidHexColor(s.to_string()))
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Normalizes a user-supplied hex color.
///
/// Surrounding whitespace is trimmed and a missing `#` is added. Three-digit
/// groups are expanded by doubling each digit. Returns `None` if what remains
/// is not three or six hex digits.
pub fn normalize_hex(input: &str) -> Option<HexColor> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let expanded = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => digits.to_string(),
        _ => return None,
    };
    Some(HexColor(format!("#{}", expanded.to_ascii_uppercase())))
}

/// Normalizes `value`, falling back to `fallback` when `value` is not a
/// valid color string. Returns `None` only if both are invalid.
pub fn sanitize_color(value: &Value, fallback: &str) -> Option<HexColor> {
    value
        .as_str()
        .and_then(normalize_hex)
        .or_else(|| normalize_hex(fallback))
}

/// Interprets a JSON value as a number the way a form field would.
///
/// Numbers pass through, strings are trimmed and parsed. Everything else has
/// no numeric meaning.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Clamps `value` into `[min, max]` and rounds it to the nearest integer.
///
/// Blank strings, non-numeric input and non-finite numbers yield `fallback`
/// unchanged.
pub fn clamp_number(value: &Value, min: i64, max: i64, fallback: i64) -> i64 {
    match coerce_number(value) {
        Some(n) if n.is_finite() => n.clamp(min as f64, max as f64).round() as i64,
        _ => fallback,
    }
}

// ============================================================================
// Contrast
// ============================================================================

/// WCAG relative luminance of a color, in `[0, 1]`.
pub fn relative_luminance(color: &HexColor) -> f32 {
    let (r, g, b) = color.rgb();
    let linear: LinSrgb = Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0).into_linear();
    0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue
}

/// Picks black or white text, whichever reads better on `background`.
pub fn readable_text_color(background: &HexColor) -> HexColor {
    if relative_luminance(background) > 0.4 {
        HexColor::black()
    } else {
        HexColor::white()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn short_hex_is_expanded_and_uppercased() {
        assert_eq!(normalize_hex("#abc").unwrap().as_str(), "#AABBCC");
        assert_eq!(normalize_hex("  1fc8a1 ").unwrap().as_str(), "#1FC8A1");
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert!(normalize_hex("not-a-color").is_none());
        assert!(normalize_hex("#1234567").is_none());
        assert!(normalize_hex("#12345").is_none());
        assert!(normalize_hex("##abc").is_none());
        assert!(normalize_hex("   ").is_none());
        assert!(normalize_hex("#ggg").is_none());
    }

    #[test]
    fn sanitize_color_uses_fallback() {
        assert_eq!(
            sanitize_color(&json!("#fff"), "#000").unwrap().as_str(),
            "#FFFFFF"
        );
        assert_eq!(
            sanitize_color(&json!(42), "#123").unwrap().as_str(),
            "#112233"
        );
        assert!(sanitize_color(&json!("nope"), "also-nope").is_none());
    }

    #[test]
    fn clamp_boundaries() {
        assert_eq!(clamp_number(&json!(500), 0, 360, 90), 360);
        assert_eq!(clamp_number(&json!(-5), 0, 100, 0), 0);
        assert_eq!(clamp_number(&json!(""), 0, 40, 7), 7);
        assert_eq!(clamp_number(&json!("   "), 0, 40, 7), 7);
        assert_eq!(clamp_number(&json!("abc"), 0, 40, 7), 7);
        assert_eq!(clamp_number(&json!("12.5"), 0, 40, 7), 13);
        assert_eq!(clamp_number(&json!(33.4), 0, 100, 0), 33);
        assert_eq!(clamp_number(&json!("Infinity"), 0, 40, 7), 7);
        assert_eq!(clamp_number(&Value::Null, 0, 40, 7), 7);
        assert_eq!(clamp_number(&json!([5]), 0, 40, 7), 7);
    }

    #[test]
    fn rgb_channels() {
        let color = normalize_hex("#2B8EFB").unwrap();
        assert_eq!(color.rgb(), (0x2B, 0x8E, 0xFB));
        assert_eq!(HexColor::from_rgb_u32(0x00ab12).as_str(), "#00AB12");
    }

    #[test]
    fn text_contrast() {
        assert_eq!(readable_text_color(&HexColor::white()), HexColor::black());
        assert_eq!(readable_text_color(&HexColor::black()), HexColor::white());
        let navy: HexColor = "#2E3192".parse().unwrap();
        assert_eq!(readable_text_color(&navy), HexColor::white());
    }

    #[test]
    fn serializes_as_plain_string() {
        let color: HexColor = "abc".parse().unwrap();
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"#AABBCC\"");
    }
}
