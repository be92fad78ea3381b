//! Snapshot collaborator interface

use async_trait::async_trait;

use crate::AlertObservation;

pub type SnapshotResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Persists a debug copy of the latest observation for an alert.
///
/// Writes are keyed by alert name and overwrite any earlier snapshot for the
/// same name.
#[async_trait]
pub trait SnapshotWriter: Send + Sync {
    async fn write(&self, key: &str, observation: &AlertObservation) -> SnapshotResult;
}
