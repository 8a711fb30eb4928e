//! Log query endpoints.
//!
//! Read-only log search for the dashboard, plus the per-trace log view
//! used by the trace detail page.

use crate::routes::{query_error_response, ApiError};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::models::LogRecord;
use shared::query::LogsFilter;

/// Response for log queries.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogsResponse {
    /// The matching logs, newest first.
    pub logs: Vec<LogRecord>,
    /// Total count of matching logs (for pagination, not the page size).
    pub count: usize,
}

/// Creates the log query routes.
///
/// # Routes
///
/// - `GET /api/observability/logs` - filtered log search
/// - `GET /api/observability/traces/{trace_id}/logs` - logs of one trace
pub fn logs_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/observability/logs", get(query_logs))
        .route(
            "/api/observability/traces/{trace_id}/logs",
            get(logs_for_trace),
        )
        .with_state(state)
}

async fn query_logs(
    State(state): State<AppState>,
    Query(filter): Query<LogsFilter>,
) -> Result<Json<LogsResponse>, (StatusCode, Json<ApiError>)> {
    let page = state
        .service()
        .logs(&filter)
        .map_err(|e| query_error_response(&e))?;

    Ok(Json(LogsResponse {
        logs: page.logs,
        count: page.count,
    }))
}

async fn logs_for_trace(
    State(state): State<AppState>,
    Path(trace_id): Path<String>,
) -> Result<Json<LogsResponse>, (StatusCode, Json<ApiError>)> {
    let page = state
        .service()
        .logs_for_trace(&trace_id)
        .map_err(|e| query_error_response(&e))?;

    Ok(Json(LogsResponse {
        logs: page.logs,
        count: page.count,
    }))
}
