//! External notification

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{AlertConfig, NotifyError};

/// Delivers a transition downstream
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, key: &str, status: &str) -> Result<(), NotifyError>;
}

/// Runs an executable with the alert name and status as its two arguments
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: PathBuf,
    working_dir: PathBuf,
    timeout: Option<Duration>,
}

impl CommandNotifier {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir: PathBuf::from("."),
            timeout: None,
        }
    }

    pub fn from_config(config: &AlertConfig) -> Self {
        Self {
            program: config.notify_command.clone(),
            working_dir: config.notify_working_dir.clone(),
            timeout: config.notify_timeout(),
        }
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Notifier for CommandNotifier {
    async fn notify(&self, key: &str, status: &str) -> Result<(), NotifyError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(key)
            .arg(status)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        debug!(program = %self.program.display(), alert = key, status, "Starting notifier");
        let mut child = cmd.spawn()?;

        let exit = match self.timeout {
            Some(limit) => {
                let waited = tokio::time::timeout(limit, child.wait()).await;
                match waited {
                    Ok(exit) => exit?,
                    Err(_) => {
                        warn!(alert = key, "Notifier exceeded {:?}, killing it", limit);
                        if let Err(e) = child.kill().await {
                            warn!("Failed to kill notifier: {}", e);
                        }
                        return Err(NotifyError::Timeout {
                            secs: limit.as_secs(),
                        });
                    }
                }
            }
            None => child.wait().await?,
        };

        if exit.success() {
            Ok(())
        } else {
            match exit.code() {
                Some(code) => Err(NotifyError::ExitStatus { code }),
                None => Err(NotifyError::Signaled),
            }
        }
    }
}
