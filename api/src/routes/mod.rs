//! API route definitions.
//!
//! This module organizes all HTTP routes for the Sightline API server.
//! Every observability endpoint is read-only; errors map to a shared
//! `{error, message}` JSON shape with a 500 for retryable store failures
//! and a 404 for point lookups that found nothing.

mod health;
mod logs;
mod metrics;
mod overview;
mod traces;

pub use health::health_routes;
pub use logs::logs_routes;
pub use metrics::metrics_routes;
pub use overview::overview_routes;
pub use traces::traces_routes;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use shared::service::QueryError;

/// Error response body shared by all observability endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-readable error kind.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Maps a service error to an HTTP response.
///
/// Retryable infrastructure failures become 500 so the dashboard can show
/// a retry affordance; a missed point lookup becomes 404.
pub(crate) fn query_error_response(err: &QueryError) -> (StatusCode, Json<ApiError>) {
    if err.is_retryable() {
        tracing::error!(error = %err, "query failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: "storage_error".to_string(),
                message: err.to_string(),
            }),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "not_found".to_string(),
                message: err.to_string(),
            }),
        )
    }
}
