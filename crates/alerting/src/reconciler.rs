//! Alert Reconciler
//!
//! Turns each observation into at most one downstream side effect:
//!
//! - repeated status for a tracked alert: ignored
//! - first observation since start: snapshot written, notification suppressed
//! - status change: snapshot written, notifier invoked with `(name, status)`
//!
//! Failures are reported per alert and never roll back the recorded state.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::{
    AlertConfig, AlertObservation, AlertStateStore, CheckResult, LockScope, Notifier,
    ReconcileError, SnapshotWriter,
};

/// Successful reconciliation of a single observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertOutcome {
    /// Same status as tracked; nothing done
    DuplicateIgnored,
    /// First observation since start; recorded without notification
    BaselineRecorded,
    /// Status transition; notifier invoked successfully
    Notified,
}

impl AlertOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertOutcome::DuplicateIgnored => "duplicate_ignored",
            AlertOutcome::BaselineRecorded => "baseline_recorded",
            AlertOutcome::Notified => "notified",
        }
    }
}

/// Result for one observation of a batch
#[derive(Debug)]
pub struct AlertReport {
    pub key: String,
    pub status: String,
    pub result: Result<AlertOutcome, ReconcileError>,
}

/// Aggregated result of a batch, reports in input order
#[derive(Debug)]
pub struct BatchResult {
    pub all_ok: bool,
    pub reports: Vec<AlertReport>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.result.is_err()).count()
    }

    /// Error of the earliest failing observation
    pub fn first_failure(&self) -> Option<&ReconcileError> {
        self.reports.iter().find_map(|r| r.result.as_ref().err())
    }
}

/// Reconciles observations against a shared [`AlertStateStore`]
pub struct Reconciler {
    store: Arc<AlertStateStore>,
    snapshots: Arc<dyn SnapshotWriter>,
    notifier: Arc<dyn Notifier>,
    lock_scope: LockScope,
}

impl Reconciler {
    /// Create a reconciler holding the store lock for each alert's full
    /// reconciliation
    pub fn new(
        store: Arc<AlertStateStore>,
        snapshots: Arc<dyn SnapshotWriter>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            snapshots,
            notifier,
            lock_scope: LockScope::WholeAlert,
        }
    }

    /// Create a reconciler from configuration, using [`crate::CommandNotifier`]
    pub fn from_config(
        config: &AlertConfig,
        store: Arc<AlertStateStore>,
        snapshots: Arc<dyn SnapshotWriter>,
    ) -> Self {
        info!("Creating reconciler with config: {:?}", config);
        Self::new(
            store,
            snapshots,
            Arc::new(crate::CommandNotifier::from_config(config)),
        )
        .with_lock_scope(config.lock_scope())
    }

    pub fn with_lock_scope(mut self, lock_scope: LockScope) -> Self {
        self.lock_scope = lock_scope;
        self
    }

    pub fn store(&self) -> &Arc<AlertStateStore> {
        &self.store
    }

    /// Reconcile a single observation
    pub async fn reconcile_alert(
        &self,
        observation: &AlertObservation,
    ) -> Result<AlertOutcome, ReconcileError> {
        if let Err(e) = observation.validate() {
            warn!("Rejected alert: {}", e);
            return Err(e);
        }

        let key = observation.key.as_str();
        let status = observation.status.as_str();
        info!(alert = key, status, "Alert arrived");

        let mut guard = self.store.lock().await;
        let check = guard.check_and_update(key, status);
        if !check.is_novel {
            debug!(alert = key, status, "Status unchanged, ignoring");
            return Ok(AlertOutcome::DuplicateIgnored);
        }

        let held = match self.lock_scope {
            LockScope::WholeAlert => Some(guard),
            LockScope::UpdateOnly => {
                drop(guard);
                None
            }
        };
        let result = self.apply_side_effects(observation, check).await;
        drop(held);
        result
    }

    async fn apply_side_effects(
        &self,
        observation: &AlertObservation,
        check: CheckResult,
    ) -> Result<AlertOutcome, ReconcileError> {
        let key = observation.key.as_str();
        let status = observation.status.as_str();

        if let Err(e) = self.snapshots.write(key, observation).await {
            error!(alert = key, "Failed to write snapshot: {}", e);
            return Err(ReconcileError::SnapshotWriteFailed(e.to_string()));
        }

        if !check.was_ever_observed {
            info!(alert = key, status, "First observation since start, recorded as baseline");
            return Ok(AlertOutcome::BaselineRecorded);
        }

        if let Err(e) = self.notifier.notify(key, status).await {
            error!(alert = key, status, "Notification failed: {}", e);
            return Err(e.into());
        }

        info!(alert = key, status, "Notification sent");
        Ok(AlertOutcome::Notified)
    }

    /// Reconcile observations in order, continuing past failures
    pub async fn reconcile_batch(&self, observations: &[AlertObservation]) -> BatchResult {
        let mut reports = Vec::with_capacity(observations.len());

        for observation in observations {
            metrics::counter!("alerts_received_total").increment(1);

            let result = self.reconcile_alert(observation).await;
            match &result {
                Ok(outcome) => {
                    metrics::counter!("alerts_reconciled_total", "outcome" => outcome.as_str())
                        .increment(1);
                }
                Err(e) => {
                    metrics::counter!("alerts_failed_total", "kind" => e.kind().as_str())
                        .increment(1);
                }
            }

            reports.push(AlertReport {
                key: observation.key.clone(),
                status: observation.status.clone(),
                result,
            });
        }

        let all_ok = reports.iter().all(|r| r.result.is_ok());
        if !all_ok {
            warn!(
                "Some or all from [ {} ] alerts processed with errors",
                reports.len()
            );
        }

        BatchResult { all_ok, reports }
    }
}
