//! Per-save JSON document holding every storage preference.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StowageError;
use crate::prefs::StoragePrefs;
use crate::store::{LoadReport, PrefsStore};

/// File name of the preference document inside a save folder.
pub const PREFS_FILE_NAME: &str = "container_prefs.json";

/// Version of the document format (increment when the shape changes).
const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefsDocument {
    pub version: u32,
    pub records: Vec<StoragePrefs>,
}

impl PrefsDocument {
    pub fn from_store(store: &PrefsStore) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            records: store.records(),
        }
    }

    pub fn to_json(&self) -> Result<String, StowageError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StowageError> {
        let doc: PrefsDocument = serde_json::from_str(json)?;
        if doc.version != DOCUMENT_VERSION {
            return Err(StowageError::VersionMismatch {
                expected: DOCUMENT_VERSION,
                found: doc.version,
            });
        }
        Ok(doc)
    }

    /// Clear the store and insert every valid record.
    pub fn apply(self, store: &mut PrefsStore) -> LoadReport {
        store.load_records(self.records)
    }
}

/// Write the store to `dir/container_prefs.json`.
pub fn save_prefs(store: &PrefsStore, dir: &Path) -> Result<(), StowageError> {
    let json = PrefsDocument::from_store(store).to_json()?;
    fs::write(dir.join(PREFS_FILE_NAME), json)?;
    log::info!("Saved {} storage preferences", store.len());
    Ok(())
}

/// Restore the store from `dir/container_prefs.json`.
///
/// A missing file is a save without preferences: the store is cleared.
pub fn load_prefs(store: &mut PrefsStore, dir: &Path) -> Result<LoadReport, StowageError> {
    let path = dir.join(PREFS_FILE_NAME);
    if !path.exists() {
        store.clear();
        return Ok(LoadReport::default());
    }
    let json = fs::read_to_string(path)?;
    Ok(PrefsDocument::from_json(&json)?.apply(store))
}
