//! The gradient descriptor and its sanitizer.
//!
//! A [`GradientDescriptor`] can only be produced by the sanitizer, so every
//! instance observed by the generators, the exporter or persistence satisfies
//! the invariants below:
//!
//! - `angle` in `[0, 360]`, `blur` in `[0, 40]`, `noise` in `[0, 100]`
//! - `shape` is [`RadialShape::Circle`] only for radial gradients
//! - at least two stops, each with a position in `[0, 100]`
//! - stops sorted ascending by position
//!
//! Untrusted input (stored JSON, presets, form fields) is decoded into a
//! loosely typed [`serde_json::Value`] first and then run through
//! [`sanitize_gradient_state`], never trusted as the strict type.
//!
//! # Example
//!
//! ```
//! use gradient_studio::{sanitize_gradient_state, GradientType};
//! use serde_json::json;
//!
//! let gradient = sanitize_gradient_state(&json!({
//!     "type": "conic",
//!     "angle": "725",
//!     "stops": [{ "color": "fff", "pos": 80 }, { "color": "#000", "pos": 10 }]
//! }));
//!
//! assert_eq!(gradient.kind(), GradientType::Conic);
//! assert_eq!(gradient.angle(), 360);
//! assert_eq!(gradient.stops()[0].color().as_str(), "#000000");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::color::{clamp_number, normalize_hex, sanitize_color, HexColor};

pub const ANGLE_MAX: u16 = 360;
pub const BLUR_MAX: u8 = 40;
pub const NOISE_MAX: u8 = 100;
pub const POSITION_MAX: u8 = 100;

const DEFAULT_ANGLE: u16 = 90;
const DEFAULT_STOPS: [(&str, u8); 2] = [("#2B8EFB", 0), ("#1FC8A1", 100)];

// ============================================================================
// Enumerations
// ============================================================================

/// The gradient geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientType {
    #[default]
    Linear,
    Radial,
    Conic,
}

impl GradientType {
    pub const ALL: [Self; 3] = [Self::Linear, Self::Radial, Self::Conic];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Radial => "radial",
            Self::Conic => "conic",
        }
    }

    /// Matches the exact lowercase name; anything else is unrecognized.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for GradientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradientType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown gradient type `{s}`"))
    }
}

/// Ending shape of a radial gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RadialShape {
    #[default]
    Ellipse,
    Circle,
}

impl RadialShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ellipse => "ellipse",
            Self::Circle => "circle",
        }
    }
}

impl fmt::Display for RadialShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// GradientStop
// ============================================================================

/// A color anchored at a percentage position along the gradient axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradientStop {
    color: HexColor,
    pos: u8,
}

impl GradientStop {
    /// Creates a stop. Positions above 100 are clamped.
    pub fn new(color: HexColor, pos: u8) -> Self {
        Self {
            color,
            pos: pos.min(POSITION_MAX),
        }
    }

    pub fn color(&self) -> &HexColor {
        &self.color
    }

    pub fn pos(&self) -> u8 {
        self.pos
    }

    pub(crate) fn set_color(&mut self, color: HexColor) {
        self.color = color;
    }

    pub(crate) fn set_pos(&mut self, pos: u8) {
        self.pos = pos.min(POSITION_MAX);
    }
}

fn default_stops() -> Vec<GradientStop> {
    DEFAULT_STOPS
        .iter()
        .filter_map(|(color, pos)| Some(GradientStop::new(normalize_hex(color)?, *pos)))
        .collect()
}

/// Sanitizes one stop, taking any missing or invalid field from `fallback`.
fn sanitize_stop(candidate: &Value, fallback: &GradientStop) -> GradientStop {
    let Some(fields) = candidate.as_object() else {
        return fallback.clone();
    };

    let color = fields
        .get("color")
        .and_then(|c| sanitize_color(c, fallback.color.as_str()))
        .unwrap_or_else(|| fallback.color.clone());
    let pos = fields
        .get("pos")
        .map(|p| clamp_number(p, 0, POSITION_MAX.into(), fallback.pos.into()))
        .unwrap_or(fallback.pos.into());

    GradientStop::new(color, pos as u8)
}

// ============================================================================
// GradientDescriptor
// ============================================================================

/// The canonical record describing one gradient.
///
/// Serializes to the persisted layout
/// `{type, angle, shape, stops: [{color, pos}], blur, noise}`. Deserializing
/// goes through [`sanitize_gradient_state`], so malformed documents decode to
/// the closest valid descriptor instead of failing field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct GradientDescriptor {
    #[serde(rename = "type")]
    kind: GradientType,
    angle: u16,
    shape: RadialShape,
    stops: Vec<GradientStop>,
    blur: u8,
    noise: u8,
}

impl Default for GradientDescriptor {
    /// The blue-to-teal linear gradient shown on first launch.
    fn default() -> Self {
        Self {
            kind: GradientType::Linear,
            angle: DEFAULT_ANGLE,
            shape: RadialShape::Ellipse,
            stops: default_stops(),
            blur: 0,
            noise: 0,
        }
    }
}

impl GradientDescriptor {
    /// Builds a descriptor from typed parts, enforcing the same invariants as
    /// the sanitizer: values are clamped, a circle is kept only for radial
    /// gradients, fewer than two stops fall back to the defaults, and stops
    /// are sorted.
    pub fn from_parts(
        kind: GradientType,
        angle: u16,
        shape: RadialShape,
        stops: Vec<GradientStop>,
        blur: u8,
        noise: u8,
    ) -> Self {
        let mut descriptor = Self {
            kind,
            angle: angle.min(ANGLE_MAX),
            shape: effective_shape(kind, shape),
            stops: if stops.len() < 2 { default_stops() } else { stops },
            blur: blur.min(BLUR_MAX),
            noise: noise.min(NOISE_MAX),
        };
        descriptor.sort_stops();
        descriptor
    }

    pub fn kind(&self) -> GradientType {
        self.kind
    }

    pub fn angle(&self) -> u16 {
        self.angle
    }

    pub fn shape(&self) -> RadialShape {
        self.shape
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    pub fn blur(&self) -> u8 {
        self.blur
    }

    pub fn noise(&self) -> u8 {
        self.noise
    }

    /// Converts to the loosely typed form accepted by the sanitizer.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Serializes to the persisted JSON layout.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses JSON and sanitizes the result.
    ///
    /// Only syntactically malformed JSON is an error; any well-formed
    /// document yields a valid descriptor.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        Ok(sanitize_gradient_state(&value))
    }

    pub(crate) fn stops_mut(&mut self) -> &mut Vec<GradientStop> {
        &mut self.stops
    }

    pub(crate) fn set_kind(&mut self, kind: GradientType) {
        self.kind = kind;
        self.shape = effective_shape(kind, self.shape);
    }

    pub(crate) fn set_angle(&mut self, angle: u16) {
        self.angle = angle.min(ANGLE_MAX);
    }

    pub(crate) fn set_shape(&mut self, shape: RadialShape) {
        self.shape = effective_shape(self.kind, shape);
    }

    pub(crate) fn set_blur(&mut self, blur: u8) {
        self.blur = blur.min(BLUR_MAX);
    }

    pub(crate) fn set_noise(&mut self, noise: u8) {
        self.noise = noise.min(NOISE_MAX);
    }

    /// Stable sort by position; equal positions keep their relative order.
    pub(crate) fn sort_stops(&mut self) {
        self.stops.sort_by_key(|stop| stop.pos);
    }

    /// This descriptor with its stops in position order.
    ///
    /// Borrows unless an editor is holding a moved stop out of order.
    pub(crate) fn sorted(&self) -> Cow<'_, Self> {
        if self.stops.is_sorted_by_key(|stop| stop.pos) {
            Cow::Borrowed(self)
        } else {
            let mut sorted = self.clone();
            sorted.sort_stops();
            Cow::Owned(sorted)
        }
    }
}

impl From<Value> for GradientDescriptor {
    fn from(value: Value) -> Self {
        sanitize_gradient_state(&value)
    }
}

impl From<&Value> for GradientDescriptor {
    fn from(value: &Value) -> Self {
        sanitize_gradient_state(value)
    }
}

fn effective_shape(kind: GradientType, requested: RadialShape) -> RadialShape {
    if kind == GradientType::Radial {
        requested
    } else {
        RadialShape::Ellipse
    }
}

// ============================================================================
// Sanitizer
// ============================================================================

/// Produces a fully valid descriptor from any input.
///
/// Starts from the default descriptor and takes each field from `candidate`
/// only when it is valid. Non-object input yields the default unchanged.
/// The function is total and idempotent.
pub fn sanitize_gradient_state(candidate: &Value) -> GradientDescriptor {
    let base = GradientDescriptor::default();
    let Some(fields) = candidate.as_object() else {
        return base;
    };

    let kind = fields
        .get("type")
        .and_then(Value::as_str)
        .and_then(GradientType::parse)
        .unwrap_or(base.kind);

    let shape = match (kind, fields.get("shape").and_then(Value::as_str)) {
        (GradientType::Radial, Some("circle")) => RadialShape::Circle,
        _ => RadialShape::Ellipse,
    };

    let mut stops: Vec<GradientStop> = fields
        .get("stops")
        .and_then(Value::as_array)
        .map(|raw| {
            raw.iter()
                .enumerate()
                .map(|(i, stop)| sanitize_stop(stop, &base.stops[i % base.stops.len()]))
                .collect()
        })
        .unwrap_or_default();

    if stops.len() < 2 {
        stops = base.stops.clone();
    }

    let mut sanitized = GradientDescriptor {
        kind,
        angle: clamp_field(fields, "angle", ANGLE_MAX.into(), base.angle.into()) as u16,
        shape,
        stops,
        blur: clamp_field(fields, "blur", BLUR_MAX.into(), base.blur.into()) as u8,
        noise: clamp_field(fields, "noise", NOISE_MAX.into(), base.noise.into()) as u8,
    };
    sanitized.sort_stops();
    sanitized
}

fn clamp_field(fields: &Map<String, Value>, key: &str, max: i64, fallback: i64) -> i64 {
    fields
        .get(key)
        .map(|value| clamp_number(value, 0, max, fallback))
        .unwrap_or(fallback)
}

/// Replaces every field of `target` with the sanitized form of `candidate`.
///
/// The replacement happens in a single assignment, so `target` is never
/// observable in a partially updated state, and the stops are fresh copies
/// that share nothing with `candidate`.
pub fn apply_sanitized_state(target: &mut GradientDescriptor, candidate: &Value) {
    *target = sanitize_gradient_state(candidate);
}

// ============================================================================
// Tests
// ============================================================================
