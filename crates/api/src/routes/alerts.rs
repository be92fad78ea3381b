//! Alert Routes

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

/// Query parameters for alerts endpoint
#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    /// Filter by last status
    pub status: Option<String>,
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Tracked alert record
#[derive(Debug, Serialize)]
pub struct AlertRecord {
    pub name: String,
    pub last_status: String,
    pub ever_observed: bool,
    pub updated_at: DateTime<Utc>,
}

/// Response for alerts endpoint
#[derive(Debug, Serialize)]
pub struct AlertResponse {
    pub data: Vec<AlertRecord>,
    pub count: usize,
    pub tracked: usize,
}

/// List tracked alerts, ordered by name
pub async fn get_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertQuery>,
) -> Json<AlertResponse> {
    let tracked = state.reconciler.store().tracked().await;
    let total = tracked.len();

    let data: Vec<AlertRecord> = tracked
        .into_iter()
        .filter(|(_, s)| params.status.as_deref().map_or(true, |f| s.last_status == f))
        .take(params.limit.min(1000))
        .map(|(name, s)| AlertRecord {
            name,
            last_status: s.last_status,
            ever_observed: s.ever_observed,
            updated_at: s.updated_at,
        })
        .collect();

    Json(AlertResponse {
        count: data.len(),
        tracked: total,
        data,
    })
}
