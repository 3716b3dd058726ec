//! Named presets: the immutable built-ins and the user's custom list.
//!
//! A custom preset serializes flat, next to its gradient fields:
//!
//! ```json
//! { "name": "Dusk", "type": "linear", "angle": 120, "shape": "ellipse",
//!   "stops": [{ "color": "#FF6B6B", "pos": 0 }, { "color": "#6A1B9A", "pos": 100 }],
//!   "blur": 0, "noise": 0 }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use unicode_normalization::UnicodeNormalization;

use crate::error::EditError;
use crate::gradient::{sanitize_gradient_state, GradientDescriptor};

/// Most custom presets kept; older ones are evicted first.
pub const MAX_CUSTOM_PRESETS: usize = 20;

/// Longest preset name, in characters.
pub const MAX_PRESET_NAME_LEN: usize = 40;

// ============================================================================
// Names
// ============================================================================

/// Cleans a user-supplied preset name.
///
/// Trims, applies canonical (NFC) normalization, keeps only letters, digits,
/// whitespace, `-` and `_`, collapses whitespace runs to single spaces and
/// truncates to [`MAX_PRESET_NAME_LEN`] characters. Returns `None` when
/// nothing is left.
pub fn sanitize_preset_name(value: &str) -> Option<String> {
    let filtered: String = value
        .trim()
        .nfc()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect();
    let collapsed = filtered.split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated: String = collapsed.chars().take(MAX_PRESET_NAME_LEN).collect();
    let name = truncated.trim_end();

    (!name.is_empty()).then(|| name.to_string())
}

/// Preset names compare case-insensitively.
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

// ============================================================================
// Preset
// ============================================================================

/// A named gradient descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Preset {
    name: String,
    #[serde(flatten)]
    gradient: GradientDescriptor,
}

impl Preset {
    /// Creates a preset, or `None` if the name sanitizes to nothing.
    pub fn new(name: &str, gradient: GradientDescriptor) -> Option<Self> {
        Some(Self {
            name: sanitize_preset_name(name)?,
            gradient,
        })
    }

    /// Sanitizes an untrusted preset entry.
    ///
    /// The gradient part always sanitizes; the entry is rejected only when it
    /// is not an object or carries no usable name.
    pub fn from_value(value: &Value) -> Option<Self> {
        let name = value.get("name")?.as_str()?;
        Self::new(name, sanitize_gradient_state(value))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gradient(&self) -> &GradientDescriptor {
        &self.gradient
    }
}

impl TryFrom<Value> for Preset {
    type Error = EditError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value).ok_or(EditError::InvalidPresetName)
    }
}

/// The presets shipped with the application.
pub fn builtin_presets() -> Vec<Preset> {
    let entries = [
        json!({
            "name": "Ocean Blue", "type": "linear", "angle": 90,
            "stops": [{ "color": "#2E3192", "pos": 0 }, { "color": "#1BFFFF", "pos": 100 }]
        }),
        json!({
            "name": "Sunset", "type": "linear", "angle": 120,
            "stops": [
                { "color": "#FF6B6B", "pos": 0 },
                { "color": "#FFD93D", "pos": 50 },
                { "color": "#6A1B9A", "pos": 100 }
            ]
        }),
        json!({
            "name": "Mint", "type": "radial", "shape": "circle",
            "stops": [
                { "color": "#D4FFEC", "pos": 0 },
                { "color": "#57F2CC", "pos": 50 },
                { "color": "#45969B", "pos": 100 }
            ]
        }),
        json!({
            "name": "Royal", "type": "linear", "angle": 45,
            "stops": [{ "color": "#8E2DE2", "pos": 0 }, { "color": "#4A00E0", "pos": 100 }]
        }),
        json!({
            "name": "Pastel", "type": "conic", "angle": 180,
            "stops": [{ "color": "#A1C4FD", "pos": 0 }, { "color": "#C2E9FB", "pos": 100 }]
        }),
        json!({
            "name": "Fire", "type": "radial", "shape": "ellipse",
            "stops": [
                { "color": "#F96400", "pos": 0 },
                { "color": "#E42200", "pos": 50 },
                { "color": "#830000", "pos": 100 }
            ]
        }),
    ];
    entries.iter().filter_map(Preset::from_value).collect()
}

// ============================================================================
// CustomPresets
// ============================================================================

/// The user's presets, most recent first.
///
/// Names are unique ignoring case; a clashing name gets a numeric suffix
/// (`"Sunset"`, `"Sunset 2"`, ...). The list never grows past its capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomPresets {
    presets: Vec<Preset>,
    capacity: usize,
}

impl Default for CustomPresets {
    fn default() -> Self {
        Self::with_capacity(MAX_CUSTOM_PRESETS)
    }
}

impl CustomPresets {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            presets: Vec::new(),
            capacity,
        }
    }

    /// Rebuilds the list from untrusted stored data.
    ///
    /// Entries are sanitized one by one; an invalid entry is dropped without
    /// affecting the rest. Duplicate names are disambiguated and the result
    /// is truncated to `capacity`. Anything but an array yields an empty list.
    pub fn from_value(value: &Value, capacity: usize) -> Self {
        let mut list = Self::with_capacity(capacity);
        let Some(entries) = value.as_array() else {
            if !value.is_null() {
                log::warn!("ignoring custom presets: expected a list");
            }
            return list;
        };

        for (index, entry) in entries.iter().enumerate() {
            if list.presets.len() >= capacity {
                break;
            }
            match Preset::from_value(entry) {
                Some(mut preset) => {
                    preset.name = list.unique_name(&preset.name);
                    list.presets.push(preset);
                }
                None => log::warn!("dropping invalid custom preset at index {index}"),
            }
        }
        list
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.presets)
    }

    pub fn as_slice(&self) -> &[Preset] {
        &self.presets
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    /// Number of stored presets, at most [`capacity`](Self::capacity).
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Finds a preset by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| same_name(&p.name, name))
    }

    /// Returns `base`, or `base` with the first free numeric suffix.
    ///
    /// The base is shortened when needed so the result stays within
    /// [`MAX_PRESET_NAME_LEN`] characters.
    pub fn unique_name(&self, base: &str) -> String {
        if self.find(base).is_none() {
            return base.to_string();
        }

        (2usize..)
            .map(|n| {
                let suffix = format!(" {n}");
                let room = MAX_PRESET_NAME_LEN.saturating_sub(suffix.chars().count());
                let stem: String = base.chars().take(room).collect();
                format!("{}{suffix}", stem.trim_end())
            })
            .find(|candidate| self.find(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    /// Saves `gradient` under `name` at the front of the list.
    ///
    /// Returns the stored preset, whose name may carry a suffix. The oldest
    /// preset is evicted when the list is full.
    pub fn create(
        &mut self,
        name: &str,
        gradient: &GradientDescriptor,
    ) -> Result<&Preset, EditError> {
        let clean = sanitize_preset_name(name).ok_or(EditError::InvalidPresetName)?;
        let preset = Preset {
            name: self.unique_name(&clean),
            gradient: gradient.clone(),
        };

        self.presets.insert(0, preset);
        if self.presets.len() > self.capacity {
            let evicted = self.presets.split_off(self.capacity);
            for old in evicted {
                log::debug!("evicted custom preset \"{}\"", old.name);
            }
        }
        self.presets.first().ok_or(EditError::InvalidPresetName)
    }

    /// Removes the preset named `name`, ignoring case.
    pub fn delete(&mut self, name: &str) -> Result<Preset, EditError> {
        let index = self
            .presets
            .iter()
            .position(|p| same_name(&p.name, name))
            .ok_or_else(|| EditError::UnknownPreset(name.to_string()))?;
        Ok(self.presets.remove(index))
    }
}
