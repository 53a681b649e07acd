//! Durable local key/value slots.
//!
//! The storefront persists exactly two things locally: the cart line list and
//! the session record. Each lives in its own named slot holding human-readable
//! JSON text, with no versioning or migration logic. A reader encountering an
//! unparseable slot treats it as absent rather than failing - reload always
//! reconstructs some state, never an error.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from reading or writing a slot.
#[derive(Debug, Error)]
pub enum SlotError {
    /// The underlying storage could not be read or written
    #[error("slot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The slot rejected the operation (used by test doubles)
    #[error("slot unavailable: {0}")]
    Unavailable(String),
}

/// A durable local slot holding a single serialized value.
///
/// Uses explicit synchronous methods so a mutation can persist before the
/// next read; the backing store is a local file, not a network service.
/// Dyn-compatible so environments can hold `Arc<dyn Slot>`.
pub trait Slot: Send + Sync {
    /// Read the slot's contents. `Ok(None)` means the slot is absent.
    fn load(&self) -> Result<Option<String>, SlotError>;

    /// Overwrite the slot's contents.
    fn save(&self, contents: &str) -> Result<(), SlotError>;

    /// Remove the slot entirely. Clearing an absent slot is not an error.
    fn clear(&self) -> Result<(), SlotError>;
}

/// A slot backed by a single file on disk.
#[derive(Clone, Debug)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Creates a slot at the given path. Parent directories are created on
    /// first save, not here.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this slot reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Slot for FileSlot {
    fn load(&self) -> Result<Option<String>, SlotError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn save(&self, contents: &str) -> Result<(), SlotError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, contents)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SlotError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

/// Load and deserialize a slot, failing soft.
///
/// Returns `None` for an absent, unreadable, or unparseable slot. Failures
/// are logged for diagnostics and never surfaced to the user.
pub fn load_json<T: DeserializeOwned>(slot: &dyn Slot, name: &str) -> Option<T> {
    match slot.load() {
        Ok(Some(contents)) => match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(slot = name, %error, "discarding unparseable slot contents");
                None
            },
        },
        Ok(None) => None,
        Err(error) => {
            tracing::warn!(slot = name, %error, "failed to read slot");
            None
        },
    }
}

/// Serialize and persist a value to a slot, failing soft.
///
/// Write failures are logged; state still advances in memory
/// (last-write-wins on the next successful save).
pub fn store_json<T: Serialize>(slot: &dyn Slot, name: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(contents) => {
            if let Err(error) = slot.save(&contents) {
                tracing::warn!(slot = name, %error, "failed to persist slot");
            }
        },
        Err(error) => {
            tracing::warn!(slot = name, %error, "failed to serialize slot contents");
        },
    }
}

/// Clear a slot, failing soft.
pub fn clear_slot(slot: &dyn Slot, name: &str) {
    if let Err(error) = slot.clear() {
        tracing::warn!(slot = name, %error, "failed to clear slot");
    }
}
