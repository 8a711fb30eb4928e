//! Trace query endpoints.
//!
//! Flat span search for the trace list, and the per-trace detail view with
//! the derived span tree and timeline layout.

use crate::routes::{query_error_response, ApiError};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::aggregate::{TraceGroup, TraceSpan};
use shared::models::SpanRecord;
use shared::query::TracesFilter;
use shared::service::QueryError;

/// A span row in the flat trace list.
#[derive(Debug, Serialize)]
pub struct SpanResponse {
    /// The stored span fields.
    #[serde(flatten)]
    pub span: SpanRecord,
    /// Derived duration in floating-point milliseconds.
    pub duration_ms: f64,
}

impl From<SpanRecord> for SpanResponse {
    fn from(span: SpanRecord) -> Self {
        let duration_ms = span.duration_ms();
        Self { span, duration_ms }
    }
}

/// Response for flat span queries.
#[derive(Debug, Serialize)]
pub struct TracesResponse {
    /// The matching span rows, newest first.
    pub traces: Vec<SpanResponse>,
    /// Total count of matching spans (for pagination, not the page size).
    pub count: usize,
}

/// A span placed in the trace detail tree.
#[derive(Debug, Serialize)]
pub struct TraceTreeSpan {
    /// The placed span with depth and timeline layout.
    #[serde(flatten)]
    pub span: TraceSpan,
    /// Derived duration in floating-point milliseconds.
    pub duration_ms: f64,
}

/// Response for the trace detail view.
#[derive(Debug, Serialize)]
pub struct TraceDetailResponse {
    /// The trace id.
    pub trace_id_hex: String,
    /// Member spans in display order (depth, then start time).
    pub trace: Vec<TraceTreeSpan>,
    /// Number of member spans.
    pub span_count: usize,
    /// Number of member spans with ERROR status.
    pub error_count: usize,
    /// Maximum member duration in milliseconds.
    pub duration_ms: f64,
    /// Earliest member start time.
    pub start_time: DateTime<Utc>,
    /// Latest member end time.
    pub end_time: DateTime<Utc>,
}

impl From<TraceGroup> for TraceDetailResponse {
    fn from(group: TraceGroup) -> Self {
        Self {
            trace_id_hex: group.trace_id_hex,
            span_count: group.span_count,
            error_count: group.error_count,
            duration_ms: group.total_duration_ms,
            start_time: group.start_time,
            end_time: group.end_time,
            trace: group
                .spans
                .into_iter()
                .map(|span| {
                    let duration_ms = span.record.duration_ms();
                    TraceTreeSpan { span, duration_ms }
                })
                .collect(),
        }
    }
}

/// Creates the trace query routes.
///
/// # Routes
///
/// - `GET /api/observability/traces` - filtered flat span search
/// - `GET /api/observability/traces/{trace_id}` - span tree of one trace
pub fn traces_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/observability/traces", get(query_traces))
        .route("/api/observability/traces/{trace_id}", get(get_trace))
        .with_state(state)
}

async fn query_traces(
    State(state): State<AppState>,
    Query(filter): Query<TracesFilter>,
) -> Result<Json<TracesResponse>, (StatusCode, Json<ApiError>)> {
    let page = state
        .service()
        .traces(&filter)
        .map_err(|e| query_error_response(&e))?;

    Ok(Json(TracesResponse {
        traces: page.spans.into_iter().map(Into::into).collect(),
        count: page.count,
    }))
}

async fn get_trace(
    State(state): State<AppState>,
    Path(trace_id): Path<String>,
) -> Result<Json<TraceDetailResponse>, (StatusCode, Json<ApiError>)> {
    let spans = state
        .service()
        .trace_by_id(&trace_id)
        .map_err(|e| query_error_response(&e))?;

    let group = TraceGroup::from_spans(spans)
        .ok_or_else(|| query_error_response(&QueryError::TraceNotFound(trace_id)))?;

    Ok(Json(group.into()))
}
