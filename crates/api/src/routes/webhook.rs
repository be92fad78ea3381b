//! Webhook Route
//!
//! Accepts an Alertmanager notification, reconciles every alert in order and
//! writes exactly one response summarizing the batch.

use alerting::{AlertObservation, AlertOutcome, BatchResult, ErrorKind};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::payload::WebhookPayload;
use crate::AppState;

/// Per-alert entry of a webhook response
#[derive(Debug, Serialize)]
pub struct AlertResult {
    pub alert: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<AlertOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Webhook response body
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub message: String,
    pub total: usize,
    pub failed: usize,
    pub results: Vec<AlertResult>,
}

impl BatchResponse {
    fn new(result: &BatchResult, snapshot_dir: &Path) -> Self {
        let message = if result.all_ok {
            format!(
                "All alerts [ {} ] processed successfully. Debug files stored in {}.",
                result.total(),
                snapshot_dir.display()
            )
        } else {
            format!(
                "Some or all from [ {} ] alerts processed with errors. Debug files stored in {}.",
                result.total(),
                snapshot_dir.display()
            )
        };

        let results = result
            .reports
            .iter()
            .map(|report| match &report.result {
                Ok(outcome) => AlertResult {
                    alert: report.key.clone(),
                    status: report.status.clone(),
                    outcome: Some(*outcome),
                    error: None,
                    message: None,
                },
                Err(e) => AlertResult {
                    alert: report.key.clone(),
                    status: report.status.clone(),
                    outcome: None,
                    error: Some(e.kind()),
                    message: Some(e.to_string()),
                },
            })
            .collect();

        Self {
            message,
            total: result.total(),
            failed: result.failed(),
            results,
        }
    }
}

/// Response status for a batch: the first failure decides
fn batch_status(result: &BatchResult) -> StatusCode {
    match result.first_failure().map(|e| e.kind()) {
        None => StatusCode::OK,
        Some(ErrorKind::InvalidAlert) => StatusCode::BAD_REQUEST,
        Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Receive an Alertmanager webhook notification
pub async fn receive(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            let msg = format!("Error parsing JSON payload: {}", e);
            warn!("{}", msg);
            return (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response();
        }
    };

    if payload.alerts.is_empty() {
        let msg = "No alerts detected in JSON payload.";
        warn!("{}", msg);
        return (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response();
    }

    info!(
        receiver = %payload.receiver,
        group_key = %payload.group_key,
        alerts = payload.alerts.len(),
        "Webhook received"
    );

    let observations: Vec<AlertObservation> =
        payload.alerts.into_iter().map(AlertObservation::from).collect();
    let result = state.reconciler.reconcile_batch(&observations).await;

    let response = BatchResponse::new(&result, &state.snapshot_dir);
    info!("{}", response.message);

    (batch_status(&result), Json(response)).into_response()
}
