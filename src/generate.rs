//! CSS and SVG generation.
//!
//! Pure, deterministic functions of a sanitized [`GradientDescriptor`].

use crate::color::{readable_text_color, HexColor};
use crate::gradient::{GradientDescriptor, GradientType};

/// Largest width or height accepted for generated images.
pub const MAX_DIMENSION: u32 = 10_000;

const DEFAULT_DIMENSION: u32 = 1_000;

/// Renders the stop list as `"<color> <pos>%"` entries joined by `", "`.
fn css_stops(gradient: &GradientDescriptor) -> String {
    gradient
        .stops()
        .iter()
        .map(|stop| format!("{} {}%", stop.color(), stop.pos()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Returns the CSS `background` value, e.g. `linear-gradient(90deg, ...)`.
pub fn css_background(gradient: &GradientDescriptor) -> String {
    let stops = css_stops(gradient);
    match gradient.kind() {
        GradientType::Radial => format!("radial-gradient({}, {stops})", gradient.shape()),
        GradientType::Conic => format!("conic-gradient(from {}deg, {stops})", gradient.angle()),
        GradientType::Linear => format!("linear-gradient({}deg, {stops})", gradient.angle()),
    }
}

/// Returns the full CSS declaration, e.g.
/// `background: linear-gradient(90deg, #2B8EFB 0%, #1FC8A1 100%);`.
pub fn generate_css(gradient: &GradientDescriptor) -> String {
    format!("background: {};", css_background(gradient))
}

/// Returns the contents of the exported CSS file.
pub fn css_file_contents(gradient: &GradientDescriptor) -> String {
    format!(".generated-gradient {{\n    {}\n}}", generate_css(gradient))
}

/// Clamps a requested image dimension into `(0, MAX_DIMENSION]`.
///
/// Non-finite or non-positive values use `fallback`, under the same rules;
/// if that is unusable too the result is 1000.
pub fn safe_dimension(value: f64, fallback: f64) -> u32 {
    [value, fallback]
        .into_iter()
        .find(|v| v.is_finite() && *v > 0.0)
        .map(|v| (v.round() as u32).clamp(1, MAX_DIMENSION))
        .unwrap_or(DEFAULT_DIMENSION)
}

/// Builds a standalone SVG document filling `width` x `height` pixels.
///
/// Dimensions are clamped with [`safe_dimension`] (fallback 1000). Linear
/// gradients are rotated by `angle - 90` degrees since SVG measures angles
/// from the x axis while CSS measures them from the top. Conic gradients have
/// no SVG counterpart and are approximated by a horizontal linear gradient.
pub fn generate_svg(gradient: &GradientDescriptor, width: f64, height: f64) -> String {
    let width = safe_dimension(width, f64::from(DEFAULT_DIMENSION));
    let height = safe_dimension(height, f64::from(DEFAULT_DIMENSION));

    let stops: String = gradient
        .stops()
        .iter()
        .map(|stop| format!(r#"<stop offset="{}%" stop-color="{}"/>"#, stop.pos(), stop.color()))
        .collect();

    let definition = match gradient.kind() {
        GradientType::Linear => format!(
            r#"<linearGradient id="g" gradientTransform="rotate({})">{stops}</linearGradient>"#,
            i32::from(gradient.angle()) - 90
        ),
        GradientType::Radial => {
            format!(r#"<radialGradient id="g" cx="50%" cy="50%" r="50%">{stops}</radialGradient>"#)
        }
        GradientType::Conic => format!(r#"<linearGradient id="g">{stops}</linearGradient>"#),
    };

    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            "<defs>{defs}</defs>",
            r#"<rect width="{w}" height="{h}" fill="url(#g)"/>"#,
            "</svg>"
        ),
        w = width,
        h = height,
        defs = definition
    )
}

/// Text color for a label drawn over the gradient preview.
///
/// Judged against the middle stop.
pub fn preview_label_color(gradient: &GradientDescriptor) -> HexColor {
    let stops = gradient.stops();
    readable_text_color(stops[stops.len() / 2].color())
}
