//! Local persistence of the sensor document.
//!
//! One JSON file per entity, named after the entity id. A missing file is
//! a normal first-run condition and yields [`SensorDocument::default`];
//! any other I/O or parse problem is surfaced as a [`SyncError`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::SyncError;
use crate::models::SensorDocument;

// ---

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Store for `entity_id` inside `data_dir`, e.g. `/data/sensor.gfs_forecast.json`.
    pub fn new(data_dir: &Path, entity_id: &str) -> Self {
        Self {
            path: data_dir.join(format!("{entity_id}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted document, or the default one if none exists yet.
    pub fn restore(&self) -> Result<SensorDocument, SyncError> {
        // ---
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No persisted state at {:?}, using defaults", self.path);
                return Ok(SensorDocument::default());
            }
            Err(source) => {
                return Err(SyncError::Persistence {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&json).map_err(|source| SyncError::CorruptState {
            path: self.path.clone(),
            source,
        })
    }

    /// Overwrite the persisted document.
    ///
    /// Writes to a sibling temp file and renames it over the target so a
    /// crash mid-write never leaves a truncated document behind.
    pub fn save(&self, doc: &SensorDocument) -> Result<(), SyncError> {
        // ---
        let json = serde_json::to_string(doc).map_err(|source| SyncError::CorruptState {
            path: self.path.clone(),
            source,
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        let io_err = |source| SyncError::Persistence {
            path: self.path.clone(),
            source,
        };
        fs::write(&tmp_path, json).map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;

        tracing::debug!("Persisted sensor state ({}) to {:?}", doc.state, self.path);
        Ok(())
    }
}
