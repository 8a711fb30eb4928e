//! Health overview endpoint.
//!
//! Serves the rolling-window health summary the dashboard polls: totals,
//! error rate, average response time, grouped recent errors, and slow
//! spans. Each poll is a fresh, independent query; there is no push or
//! subscription surface.

use crate::routes::{query_error_response, ApiError};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use shared::aggregate::OverviewSnapshot;

/// Response wrapper for the overview snapshot.
#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    /// The computed snapshot.
    pub overview: OverviewSnapshot,
}

/// Creates the overview routes.
///
/// # Routes
///
/// - `GET /api/observability/overview` - rolling-window health summary
pub fn overview_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/observability/overview", get(get_overview))
        .with_state(state)
}

async fn get_overview(
    State(state): State<AppState>,
) -> Result<Json<OverviewResponse>, (StatusCode, Json<ApiError>)> {
    let overview = state
        .service()
        .overview()
        .map_err(|e| query_error_response(&e))?;

    Ok(Json(OverviewResponse { overview }))
}
