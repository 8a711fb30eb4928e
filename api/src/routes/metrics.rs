//! Metric query endpoints.
//!
//! Filtered metric search plus the aggregated histogram view backing the
//! dashboard's distribution charts.

use crate::routes::{query_error_response, ApiError};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use shared::aggregate::HistogramData;
use shared::models::MetricRecord;
use shared::query::MetricsFilter;

/// Response for metric queries.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    /// The matching metrics, newest first.
    pub metrics: Vec<MetricRecord>,
    /// Total count of matching metrics (for pagination, not the page
    /// size).
    pub count: usize,
}

/// Response for the aggregated histogram view.
#[derive(Debug, Serialize)]
pub struct HistogramResponse {
    /// The combined distribution, or null when the metric has no
    /// well-formed histogram samples.
    pub histogram: Option<HistogramData>,
}

/// Creates the metric query routes.
///
/// # Routes
///
/// - `GET /api/observability/metrics` - filtered metric search
/// - `GET /api/observability/metrics/{metric_name}/histogram` - combined
///   distribution across all samples of one metric name
pub fn metrics_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/observability/metrics", get(query_metrics))
        .route(
            "/api/observability/metrics/{metric_name}/histogram",
            get(metric_histogram),
        )
        .with_state(state)
}

async fn query_metrics(
    State(state): State<AppState>,
    Query(filter): Query<MetricsFilter>,
) -> Result<Json<MetricsResponse>, (StatusCode, Json<ApiError>)> {
    let page = state
        .service()
        .metrics(&filter)
        .map_err(|e| query_error_response(&e))?;

    Ok(Json(MetricsResponse {
        metrics: page.metrics,
        count: page.count,
    }))
}

async fn metric_histogram(
    State(state): State<AppState>,
    Path(metric_name): Path<String>,
) -> Result<Json<HistogramResponse>, (StatusCode, Json<ApiError>)> {
    let histogram = state
        .service()
        .metric_histogram(&metric_name)
        .map_err(|e| query_error_response(&e))?;

    Ok(Json(HistogramResponse { histogram }))
}
