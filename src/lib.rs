//! gradient-studio: CSS gradient editing, persistence and export
//!
//! This crate holds the core of a gradient editor: a sanitized gradient
//! model, stop list editing, CSS/SVG generation, named presets, key-value
//! persistence and PNG/JPEG/SVG/CSS export.
//!
//! # Example
//!
//! ```
//! use gradient_studio::{generate_css, sanitize_gradient_state};
//! use serde_json::json;
//!
//! // Untrusted input is sanitized, never trusted as-is
//! let gradient = sanitize_gradient_state(&json!({
//!     "type": "radial",
//!     "shape": "circle",
//!     "stops": [{ "color": "#fff", "pos": 0 }, { "color": "000000", "pos": 100 }]
//! }));
//!
//! assert_eq!(
//!     generate_css(&gradient),
//!     "background: radial-gradient(circle, #FFFFFF 0%, #000000 100%);"
//! );
//! ```
//!
//! # Editing Session
//!
//! [`GradientEditor`] owns the live gradient and saves it to a [`Storage`]
//! backend as it changes:
//!
//! ```
//! use gradient_studio::{GradientEditor, MemoryStorage, STATE_KEY, Storage};
//!
//! let mut editor = GradientEditor::open(MemoryStorage::new());
//! editor.apply_preset("Sunset").unwrap();
//! editor.reverse_stops();
//! editor.save_preset("Sunset reversed").unwrap();
//!
//! // Reopening the same storage restores the session
//! let storage = editor.into_storage();
//! assert!(storage.get(STATE_KEY).unwrap().is_some());
//! let editor = GradientEditor::open(storage);
//! assert_eq!(editor.custom_presets().len(), 1);
//! ```

mod color;
mod debounce;
mod editor;
mod error;
mod export;
mod generate;
mod gradient;
mod preset;
mod stops;
mod store;
mod swatches;

pub use color::{
    clamp_number, normalize_hex, readable_text_color, relative_luminance, sanitize_color,
    HexColor, InvalidHexColor,
};
pub use debounce::Debouncer;
pub use editor::{Configurable, EditorSettings, GradientEditor};
pub use error::{EditError, ExportError, StorageError};
pub use export::raster::{noise_tile, overlay_tiled, rasterize_svg, NOISE_TILE_SIZE};
pub use export::{
    export, export_css, export_raster, export_svg, Artifact, EncodedImage, ExportFormat,
    RasterExport, RasterFormat, RasterState, Resolution,
};
pub use generate::{
    css_background, css_file_contents, generate_css, generate_svg, preview_label_color,
    safe_dimension, MAX_DIMENSION,
};
pub use gradient::{
    apply_sanitized_state, sanitize_gradient_state, GradientDescriptor, GradientStop,
    GradientType, RadialShape, ANGLE_MAX, BLUR_MAX, NOISE_MAX, POSITION_MAX,
};
pub use preset::{
    builtin_presets, sanitize_preset_name, CustomPresets, Preset, MAX_CUSTOM_PRESETS,
    MAX_PRESET_NAME_LEN,
};
pub use stops::{
    add_stop, clamp_active, distribute_stops, remove_stop, reorder_stops, reverse_stops,
    MIN_STOPS,
};
pub use store::{
    load_custom_presets, load_state, save_custom_presets, save_state, FileStorage, LoadOutcome,
    MemoryStorage, SaveOutcome, Storage, PRESETS_KEY, STATE_KEY,
};
pub use swatches::{Palette, MATERIAL, PALETTES, TAILWIND};
