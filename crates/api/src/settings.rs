//! Service configuration
//!
//! Settings come from an optional config file layered under environment
//! variables, e.g. `ALERT_RELAY_SERVER__LISTEN_ADDR=127.0.0.1:9000`.

use alerting::AlertConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use storage::SnapshotConfig;

pub const DEFAULT_CONFIG_PATH: &str = "alertmanager-relay.toml";
pub const ENV_PREFIX: &str = "ALERT_RELAY";

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Path accepting webhook POSTs
    pub webhook_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:6666".to_string(),
            webhook_path: "/".to_string(),
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub snapshot: SnapshotConfig,
    pub alerting: AlertConfig,
    pub logging: LoggingConfig,
}

/// Load settings from `path` (if it exists) and the environment
pub fn load_settings(path: &Path) -> Result<Settings, config::ConfigError> {
    let settings: Settings = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    if !settings.server.webhook_path.starts_with('/') {
        return Err(config::ConfigError::Message(format!(
            "server.webhook_path must start with '/', got {:?}",
            settings.server.webhook_path
        )));
    }

    Ok(settings)
}
