//! Alert observations

use serde::{Deserialize, Serialize};

use crate::ReconcileError;

/// Free-form alert annotations, carried through to snapshots only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    pub description: String,
    pub summary: String,
}

/// One reported instance of a named alert
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertObservation {
    /// Alert name; identifies the tracked alert across its lifecycle
    pub key: String,
    /// Reported status, compared as an opaque token
    pub status: String,
    pub annotations: Annotations,
    pub generator_url: String,
}

impl AlertObservation {
    /// Create an observation with empty annotations and generator URL
    pub fn new(key: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status: status.into(),
            ..Default::default()
        }
    }

    /// Attach annotations
    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Attach the generator URL
    pub fn with_generator_url(mut self, url: impl Into<String>) -> Self {
        self.generator_url = url.into();
        self
    }

    /// Check that the fields required for reconciliation are present
    pub fn validate(&self) -> Result<(), ReconcileError> {
        if self.key.is_empty() {
            return Err(ReconcileError::InvalidAlert { field: "name" });
        }
        if self.status.is_empty() {
            return Err(ReconcileError::InvalidAlert { field: "status" });
        }
        Ok(())
    }
}
