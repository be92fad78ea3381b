//! Alert State Store
//!
//! Single source of truth for the last status seen per alert name. All keys
//! share one lock so the read-decide-write of [`StoreGuard::check_and_update`]
//! is atomic with respect to every other alert's traffic.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Tracked state for one alert name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedAlertState {
    /// Status of the last novel observation
    pub last_status: String,
    /// Set once any observation for this alert has been recorded
    pub ever_observed: bool,
    /// When `last_status` was last written
    pub updated_at: DateTime<Utc>,
}

/// Outcome of [`StoreGuard::check_and_update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckResult {
    /// The status differs from the tracked one, or the alert was untracked
    pub is_novel: bool,
    /// The alert had been recorded before this call
    pub was_ever_observed: bool,
}

/// Process-wide alert state, shared by handle
#[derive(Debug, Default)]
pub struct AlertStateStore {
    states: Mutex<HashMap<String, TrackedAlertState>>,
}

/// Exclusive access to the store; the lock is released on drop
pub struct StoreGuard<'a> {
    states: MutexGuard<'a, HashMap<String, TrackedAlertState>>,
}

impl AlertStateStore {
    /// Create an empty store
    pub fn new() -> Self {
        info!("Creating alert state store");
        Self::default()
    }

    /// Wait for exclusive access to the store
    pub async fn lock(&self) -> StoreGuard<'_> {
        StoreGuard {
            states: self.states.lock().await,
        }
    }

    /// Atomically compare `status` against the tracked state and record it
    /// if novel
    pub async fn check_and_update(&self, key: &str, status: &str) -> CheckResult {
        self.lock().await.check_and_update(key, status)
    }

    /// Copy of the tracked state for one alert
    pub async fn get(&self, key: &str) -> Option<TrackedAlertState> {
        self.states.lock().await.get(key).cloned()
    }

    /// Copy of every tracked alert, ordered by name
    pub async fn tracked(&self) -> Vec<(String, TrackedAlertState)> {
        let states = self.states.lock().await;
        let mut tracked: Vec<_> = states
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        tracked.sort_by(|a, b| a.0.cmp(&b.0));
        tracked
    }

    /// Number of tracked alerts
    pub async fn len(&self) -> usize {
        self.states.lock().await.len()
    }

    /// Whether no alert has been recorded yet
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl StoreGuard<'_> {
    /// Compare `status` against the tracked state for `key` and, if novel,
    /// record it. `was_ever_observed` reflects the state before the write.
    pub fn check_and_update(&mut self, key: &str, status: &str) -> CheckResult {
        let current = self.states.get(key);
        let was_ever_observed = current.map_or(false, |s| s.ever_observed);
        let is_novel = current.map_or(true, |s| s.last_status != status);

        if is_novel {
            self.states.insert(
                key.to_string(),
                TrackedAlertState {
                    last_status: status.to_string(),
                    ever_observed: true,
                    updated_at: Utc::now(),
                },
            );
            debug!(alert = key, status, was_ever_observed, "Recorded alert status");
        }

        CheckResult {
            is_novel,
            was_ever_observed,
        }
    }
}
