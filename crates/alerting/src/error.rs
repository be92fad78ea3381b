//! Reconciliation Error Types

use serde::Serialize;
use thiserror::Error;

/// Errors from launching or awaiting the external notifier
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The notifier could not be started or awaited
    #[error("Failed to launch notifier: {0}")]
    Launch(#[from] std::io::Error),

    /// The notifier ran but reported failure
    #[error("Notifier exited with code {code}")]
    ExitStatus { code: i32 },

    /// The notifier was terminated by a signal
    #[error("Notifier terminated by signal")]
    Signaled,

    /// The notifier did not finish within the configured limit
    #[error("Notifier timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Per-alert reconciliation failure
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Required field missing from the observation
    #[error("Missing or invalid alert {field}")]
    InvalidAlert { field: &'static str },

    /// Snapshot could not be persisted; the state transition still stands
    #[error("Snapshot write failed: {0}")]
    SnapshotWriteFailed(String),

    /// External notification failed
    #[error("Notification failed: {0}")]
    NotifyFailed(#[from] NotifyError),
}

/// Coarse classification of [`ReconcileError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidAlert,
    SnapshotWriteFailed,
    NotifyFailed,
}

impl ErrorKind {
    /// Stable label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidAlert => "invalid_alert",
            ErrorKind::SnapshotWriteFailed => "snapshot_write_failed",
            ErrorKind::NotifyFailed => "notify_failed",
        }
    }
}

impl ReconcileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconcileError::InvalidAlert { .. } => ErrorKind::InvalidAlert,
            ReconcileError::SnapshotWriteFailed(_) => ErrorKind::SnapshotWriteFailed,
            ReconcileError::NotifyFailed(_) => ErrorKind::NotifyFailed,
        }
    }
}
