//! Error and outcome types for the sensor synchronization.

use std::path::PathBuf;

use thiserror::Error;

// ---

/// Failures that abort the current operation.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("could not acquire hub config after {attempts} attempts")]
    ConfigUnavailable { attempts: u32 },

    #[error("sensor state I/O failed at {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("persisted sensor state at {path} is unreadable: {source}")]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SyncError {
    /// Whether the operation failed on local storage rather than the hub.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, Self::Persistence { .. } | Self::CorruptState { .. })
    }
}

/// A push the hub did not accept. `status` is `None` when the request
/// never got a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("hub rejected sensor update ({}): {body}", status_label(.status))]
pub struct PublishFailed {
    pub status: Option<u16>,
    pub body: String,
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "no response".to_string(), |s| s.to_string())
}

/// Result of a transition that made it to the push step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The hub accepted the document and it was written to disk.
    Persisted,
    /// The hub refused; the persisted snapshot is unchanged.
    PublishFailed(PublishFailed),
}

impl SyncOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted)
    }
}
