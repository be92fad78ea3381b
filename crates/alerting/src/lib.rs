//! Alerting System
//!
//! Tracks the last reported status of every named alert, drops repeated
//! reports, and notifies downstream only on genuine status transitions.
//!
//! The [`Reconciler`] is the entry point: it validates each
//! [`AlertObservation`], consults the shared [`AlertStateStore`], writes a
//! debug snapshot through a [`SnapshotWriter`] and, for transitions, invokes a
//! [`Notifier`].

mod config;
mod error;
mod notifier;
mod observation;
mod reconciler;
mod snapshot;
mod store;

pub use config::{AlertConfig, LockScope};
pub use error::{ErrorKind, NotifyError, ReconcileError};
pub use notifier::{CommandNotifier, Notifier};
pub use observation::{AlertObservation, Annotations};
pub use reconciler::{AlertOutcome, AlertReport, BatchResult, Reconciler};
pub use snapshot::{SnapshotResult, SnapshotWriter};
pub use store::{AlertStateStore, CheckResult, StoreGuard, TrackedAlertState};
