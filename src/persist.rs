//! Snapshot persistence for the answer store.
//!
//! The store is small, so durability is a whole-snapshot contract: every
//! save rewrites the full durable representation. Write cost is
//! proportional to the total stored data, not to the size of the change.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted layout: one object with a `questions` map from normalized
/// question text to its ordered list of answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub questions: HashMap<String, Vec<String>>,
}

/// Errors that can occur while loading or saving a snapshot
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed data file: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Full-snapshot persistence contract.
pub trait DurableSink: Send + Sync {
    /// Load the last saved snapshot, `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<Snapshot>, PersistError>;

    /// Overwrite the durable representation with `snapshot`.
    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError>;
}

/// Sink that keeps the snapshot as pretty-printed JSON in a single file.
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DurableSink for JsonFile {
    fn load(&self) -> Result<Option<Snapshot>, PersistError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&data)?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        let data = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
