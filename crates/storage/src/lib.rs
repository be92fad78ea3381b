//! Storage Layer
//!
//! Persists debug snapshots of the latest observation per alert name.

mod snapshot;

pub use snapshot::{sanitize_name, SnapshotConfig, SnapshotStore};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
