//! Alertmanager Relay API Server
//!
//! Receives Alertmanager webhook notifications, reconciles each alert against
//! the in-memory alert state and relays genuine transitions to the configured
//! notifier.

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

use alerting::{AlertStateStore, Reconciler};
use storage::SnapshotStore;

pub mod payload;
mod routes;
pub mod settings;

pub use settings::{load_settings, LoggingConfig, ServerConfig, Settings, DEFAULT_CONFIG_PATH};

/// Application state shared across handlers
pub struct AppState {
    /// Alert reconciler, owning the handle to the alert state store
    pub reconciler: Reconciler,
    /// Where snapshots are written, reported in webhook responses
    pub snapshot_dir: PathBuf,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(reconciler: Reconciler, snapshot_dir: PathBuf) -> Self {
        Self {
            reconciler,
            snapshot_dir,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }

    /// Build the production state: fresh store, file snapshots, command notifier
    pub fn from_settings(settings: &Settings) -> Self {
        let store = Arc::new(AlertStateStore::new());
        let snapshots = Arc::new(SnapshotStore::new(settings.snapshot.clone()));
        let reconciler = Reconciler::from_config(&settings.alerting, store, snapshots);
        Self::new(reconciler, settings.snapshot.directory.clone())
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub tracked_alerts: usize,
}

/// Create the application router.
///
/// With the default webhook path `/`, POSTs to any unrouted path are also
/// treated as webhooks, so Alertmanager receivers may use any URL path.
pub fn create_router(state: Arc<AppState>, webhook_path: &str) -> Router {
    let router = Router::new()
        .route(webhook_path, post(routes::webhook::receive))
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/alerts", get(routes::alerts::get_alerts));

    let router = if webhook_path == "/" {
        router.fallback_service(
            post(routes::webhook::receive).with_state::<()>(state.clone()),
        )
    } else {
        router
    };

    router.with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        tracked_alerts: state.reconciler.store().len().await,
    })
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Run the server until interrupted
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let metrics = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    let state = Arc::new(AppState::from_settings(&settings));
    let app = create_router(state, &settings.server.webhook_path)
        .merge(routes::metrics::router(metrics))
        .layer(TraceLayer::new_for_http());

    info!(
        "Starting webhook server on {} (path {}), snapshots in {}",
        settings.server.listen_addr,
        settings.server.webhook_path,
        settings.snapshot.directory.display()
    );

    let listener = tokio::net::TcpListener::bind(&settings.server.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Webhook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use alerting::{NotifyError, Notifier};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use storage::SnapshotConfig;

    #[derive(Default)]
    pub struct RecordingNotifier {
        pub calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, key: &str, status: &str) -> Result<(), NotifyError> {
            self.calls
                .lock()
                .unwrap()
                .push((key.to_string(), status.to_string()));
            Ok(())
        }
    }

    pub struct TestApp {
        pub router: Router,
        pub state: Arc<AppState>,
        pub notifier: Arc<RecordingNotifier>,
        pub dir: tempfile::TempDir,
    }

    pub fn test_app() -> TestApp {
        test_app_at("/")
    }

    pub fn test_app_at(webhook_path: &str) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let snapshots = Arc::new(SnapshotStore::new(SnapshotConfig {
            directory: dir.path().to_path_buf(),
            ..Default::default()
        }));
        let notifier = Arc::new(RecordingNotifier::default());
        let reconciler = Reconciler::new(
            Arc::new(AlertStateStore::new()),
            snapshots,
            notifier.clone(),
        );
        let state = Arc::new(AppState::new(reconciler, dir.path().to_path_buf()));

        TestApp {
            router: create_router(state.clone(), webhook_path),
            state,
            notifier,
            dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::test_app;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_reports_tracked_alerts() {
        let app = test_app();
        app.state
            .reconciler
            .store()
            .check_and_update("DiskFull", "firing")
            .await;

        let response = app
            .router
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["tracked_alerts"], 1);
    }
}
