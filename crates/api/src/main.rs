//! Alertmanager Relay - Main Entry Point
//!
//! Usage: `alertmanager-relay [CONFIG_FILE]`

use anyhow::Context;
use api::{init_logging, load_settings, run_server, DEFAULT_CONFIG_PATH};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let settings = load_settings(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;
    init_logging(&settings.logging)?;

    info!("=== Alertmanager Relay v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Notifier: {} (working dir {})",
        settings.alerting.notify_command.display(),
        settings.alerting.notify_working_dir.display()
    );

    run_server(settings).await
}
