//! Error types for storage, editing and export.
//!
//! Untrusted input never produces an error: it is absorbed by the sanitizer.
//! The types here cover the remaining failures, which callers surface to the
//! user as transient, non-fatal notices.

use thiserror::Error;

use crate::stops::MIN_STOPS;

/// Failure of a key-value storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing medium could not be read or written.
    #[error("storage I/O failed for key `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the value would exceed the backend's capacity.
    #[error("storage quota exceeded writing `{key}` ({needed} bytes needed, {available} available)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },

    /// The key contains characters the backend cannot address.
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
}

/// An edit the state manager refused to perform.
///
/// The `Display` text is meant to be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("Minimum of {min} stops is required.")]
    MinimumStops { min: usize },

    #[error("Stop {index} does not exist ({len} stops).")]
    StopIndex { index: usize, len: usize },

    #[error("Preset name must contain letters or digits.")]
    InvalidPresetName,

    #[error("No preset named \"{0}\".")]
    UnknownPreset(String),

    #[error("No palette named \"{0}\".")]
    UnknownPalette(String),

    #[error("Palette \"{palette}\" has no swatch named \"{swatch}\".")]
    UnknownSwatch { palette: String, swatch: String },
}

impl EditError {
    pub(crate) fn minimum_stops() -> Self {
        Self::MinimumStops { min: MIN_STOPS }
    }
}

/// Failure while producing an exported artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The intermediate SVG could not be decoded into a render tree.
    #[error("Error creating image: {0}")]
    Decode(String),

    /// No pixel surface of the requested size could be allocated.
    #[error("Could not allocate a {width}x{height} surface.")]
    Surface { width: u32, height: u32 },

    /// The image encoder rejected the rendered surface.
    #[error("Error encoding image: {0}")]
    Encode(#[from] image::ImageError),

    /// Encoding was requested before the surface was rendered.
    #[error("Image has not been rendered yet.")]
    NotRendered,

    #[error("Error writing export: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_stops_message_is_user_facing() {
        assert_eq!(
            EditError::minimum_stops().to_string(),
            "Minimum of 2 stops is required."
        );
    }

    #[test]
    fn quota_error_names_key() {
        let err = StorageError::QuotaExceeded {
            key: "gradient-state".into(),
            needed: 300,
            available: 10,
        };
        assert!(err.to_string().contains("gradient-state"));
    }
}
