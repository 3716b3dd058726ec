//! Persistence of the live gradient and the custom preset list.
//!
//! Values are stored as JSON strings in a key-value [`Storage`] backend. The
//! adapter functions here never fail: storage errors are logged and reported
//! through [`SaveOutcome`] / [`LoadOutcome`], leaving the in-memory state
//! authoritative.
//!
//! | Key | Value |
//! |---|---|
//! | [`STATE_KEY`] | the serialized [`GradientDescriptor`] |
//! | [`PRESETS_KEY`] | a list of `{name, type, angle, shape, stops, blur, noise}` |

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use serde_json::Value;

use crate::error::StorageError;
use crate::gradient::{apply_sanitized_state, GradientDescriptor};
use crate::preset::CustomPresets;

pub const STATE_KEY: &str = "gradient-state";
pub const PRESETS_KEY: &str = "custom-gradient-presets";

// ============================================================================
// Storage Trait
// ============================================================================

/// A string key-value store.
pub trait Storage {
    /// Returns the value under `key`, or `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Result of a save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The value reached the backend.
    Persisted,
    /// The backend refused the write; the value lives only in memory
    /// ("saved for now").
    MemoryOnly,
}

impl SaveOutcome {
    pub fn is_persisted(self) -> bool {
        self == Self::Persisted
    }
}

/// Result of a load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A stored value was found and applied after sanitization.
    Loaded,
    /// Nothing was stored under the key.
    Missing,
    /// The backend failed or the stored value was not valid JSON; the prior
    /// state was kept.
    Failed,
}

// ============================================================================
// Adapter
// ============================================================================

fn write(storage: &mut impl Storage, key: &str, json: Result<String, serde_json::Error>) -> SaveOutcome {
    let json = match json {
        Ok(json) => json,
        Err(err) => {
            log::error!("could not serialize `{key}`: {err}");
            return SaveOutcome::MemoryOnly;
        }
    };

    match storage.set(key, &json) {
        Ok(()) => {
            log::debug!("saved `{key}` ({} bytes)", json.len());
            SaveOutcome::Persisted
        }
        Err(err) => {
            log::error!("could not save `{key}`: {err}");
            SaveOutcome::MemoryOnly
        }
    }
}

fn read(storage: &impl Storage, key: &str) -> Result<Option<Value>, LoadOutcome> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Ok(None),
        Err(err) => {
            log::error!("could not read `{key}`: {err}");
            return Err(LoadOutcome::Failed);
        }
    };

    serde_json::from_str(&raw).map(Some).map_err(|err| {
        log::error!("stored `{key}` is not valid JSON: {err}");
        LoadOutcome::Failed
    })
}

/// Writes the live gradient under [`STATE_KEY`], stops in position order.
pub fn save_state(storage: &mut impl Storage, gradient: &GradientDescriptor) -> SaveOutcome {
    write(storage, STATE_KEY, gradient.sorted().to_json())
}

/// Replaces `target` with the sanitized stored gradient, if there is one.
///
/// `target` is untouched unless the outcome is [`LoadOutcome::Loaded`].
pub fn load_state(storage: &impl Storage, target: &mut GradientDescriptor) -> LoadOutcome {
    match read(storage, STATE_KEY) {
        Ok(Some(value)) => {
            apply_sanitized_state(target, &value);
            log::debug!("loaded gradient state");
            LoadOutcome::Loaded
        }
        Ok(None) => LoadOutcome::Missing,
        Err(outcome) => outcome,
    }
}

/// Writes the custom preset list under [`PRESETS_KEY`].
pub fn save_custom_presets(storage: &mut impl Storage, presets: &CustomPresets) -> SaveOutcome {
    write(storage, PRESETS_KEY, presets.to_json())
}

/// Reads the custom preset list, keeping at most `capacity` entries.
///
/// Invalid entries are dropped one by one; an unreadable list yields an
/// empty one.
pub fn load_custom_presets(storage: &impl Storage, capacity: usize) -> (CustomPresets, LoadOutcome) {
    match read(storage, PRESETS_KEY) {
        Ok(Some(value)) => {
            let presets = CustomPresets::from_value(&value, capacity);
            log::debug!("loaded {} custom presets", presets.len());
            (presets, LoadOutcome::Loaded)
        }
        Ok(None) => (CustomPresets::with_capacity(capacity), LoadOutcome::Missing),
        Err(outcome) => (CustomPresets::with_capacity(capacity), outcome),
    }
}
