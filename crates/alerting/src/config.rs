//! Alerting configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// How much of an alert's reconciliation runs under the store lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockScope {
    /// Check, snapshot and notify all run under the lock. Side effects for
    /// the same alert can never interleave.
    WholeAlert,
    /// Only the check-and-update runs under the lock. Two concurrent
    /// transitions of one alert may notify out of commit order.
    UpdateOnly,
}

/// Alert handling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Executable invoked as `<command> <alert name> <status>` on transitions
    pub notify_command: PathBuf,
    /// Working directory for the notifier
    pub notify_working_dir: PathBuf,
    /// Bounded wait for the notifier (seconds, 0 = wait indefinitely)
    pub notify_timeout_secs: u64,
    /// Hold the store lock across snapshot and notification
    pub hold_lock_during_side_effects: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            notify_command: PathBuf::from("./prometheus-alertmanager-http-server-notify.sh"),
            notify_working_dir: PathBuf::from("."),
            notify_timeout_secs: 30,
            hold_lock_during_side_effects: true,
        }
    }
}

impl AlertConfig {
    pub fn notify_timeout(&self) -> Option<Duration> {
        match self.notify_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn lock_scope(&self) -> LockScope {
        if self.hold_lock_during_side_effects {
            LockScope::WholeAlert
        } else {
            LockScope::UpdateOnly
        }
    }
}
