// Operational counters for the admin key holder

use crate::core::error::MonitoringError;
use crate::core::state::AppState;
use crate::metrics::collector::MetricsSnapshot;
use crate::utils::auth::api_key_matches;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub api_key: Option<String>,
}

/// GET /metrics?api_key=...
///
/// Account and hotel activity counters plus store sizes and uptime.
pub async fn metrics_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MetricsQuery>,
) -> Result<Json<MetricsSnapshot>, MonitoringError> {
    if !api_key_matches(params.api_key.as_deref(), &state.config.admin.api_key) {
        warn!("Unauthorized metrics access attempt");
        return Err(MonitoringError::InvalidApiKey);
    }

    Ok(Json(state.metrics.get_snapshot(&state.users, &state.hotels)))
}
