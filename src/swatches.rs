//! Built-in color palettes offered as swatches.

use crate::color::{normalize_hex, HexColor};
use crate::error::EditError;

/// A named group of swatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub swatches: &'static [(&'static str, &'static str)],
}

pub const TAILWIND: Palette = Palette {
    name: "tailwind",
    swatches: &[
        ("Slate", "#64748b"),
        ("Gray", "#6b7280"),
        ("Red", "#ef4444"),
        ("Orange", "#f97316"),
        ("Amber", "#f59e0b"),
        ("Yellow", "#eab308"),
        ("Lime", "#84cc16"),
        ("Green", "#22c55e"),
        ("Emerald", "#10b981"),
        ("Teal", "#14b8a6"),
        ("Cyan", "#06b6d4"),
        ("Sky", "#0ea5e9"),
        ("Blue", "#3b82f6"),
        ("Indigo", "#6366f1"),
        ("Violet", "#8b5cf6"),
        ("Purple", "#a855f7"),
        ("Fuchsia", "#d946ef"),
        ("Pink", "#ec4899"),
        ("Rose", "#f43f5e"),
    ],
};

pub const MATERIAL: Palette = Palette {
    name: "material",
    swatches: &[
        ("Red", "#f44336"),
        ("Pink", "#e91e63"),
        ("Purple", "#9c27b0"),
        ("Deep Purple", "#673ab7"),
        ("Indigo", "#3f51b5"),
        ("Blue", "#2196f3"),
        ("Light Blue", "#03a9f4"),
        ("Cyan", "#00bcd4"),
        ("Teal", "#009688"),
        ("Green", "#4caf50"),
        ("Light Green", "#8bc34a"),
        ("Lime", "#cddc39"),
        ("Yellow", "#ffeb3b"),
        ("Amber", "#ffc107"),
        ("Orange", "#ff9800"),
        ("Deep Orange", "#ff5722"),
        ("Brown", "#795548"),
        ("Blue Gray", "#607d8b"),
    ],
};

pub const PALETTES: [Palette; 2] = [TAILWIND, MATERIAL];

impl Palette {
    /// Looks up a palette by name, ignoring case.
    pub fn by_name(name: &str) -> Result<Palette, EditError> {
        PALETTES
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| EditError::UnknownPalette(name.to_string()))
    }

    /// Returns the normalized color of the swatch named `swatch`, ignoring case.
    pub fn color(&self, swatch: &str) -> Result<HexColor, EditError> {
        self.swatches
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(swatch))
            .and_then(|(_, hex)| normalize_hex(hex))
            .ok_or_else(|| EditError::UnknownSwatch {
                palette: self.name.to_string(),
                swatch: swatch.to_string(),
            })
    }

    /// All swatches with their normalized colors, in display order.
    pub fn colors(&self) -> Vec<(&'static str, HexColor)> {
        self.swatches
            .iter()
            .filter_map(|(name, hex)| Some((*name, normalize_hex(hex)?)))
            .collect()
    }
}
