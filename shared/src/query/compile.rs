//! Filter compiler.
//!
//! Pure functions translating request-level filter objects into store
//! queries. The rules are strict: an absent filter field produces no
//! constraint, and a default is never injected as one. The single
//! exception is the result limit, which falls back to
//! [`DEFAULT_LIMIT`] to bound downstream aggregation cost, and clamps
//! invalid values to a floor of 1 instead of rejecting the request.

use crate::models::{MetricType, Severity, SpanStatus};
use crate::query::filter::{LogsFilter, MetricsFilter, TracesFilter};
use crate::storage::{LogQuery, MetricQuery, SpanQuery};

/// Result limit applied when a filter does not carry one.
pub const DEFAULT_LIMIT: usize = 100;

/// Clamps a requested limit to a sane value.
///
/// Absent limits fall back to [`DEFAULT_LIMIT`]; zero or negative limits
/// floor at 1.
#[must_use]
pub fn clamp_limit(limit: Option<i64>) -> usize {
    match limit {
        None => DEFAULT_LIMIT,
        Some(n) if n < 1 => 1,
        #[allow(clippy::cast_sign_loss)]
        Some(n) => n as usize,
    }
}

/// Compiles a logs filter into a store query.
///
/// `severity` (a band name) and `severity_min` (a raw number) both compile
/// to an inclusive floor on the severity number; when both are present the
/// stricter (higher) floor wins. Unknown band names add no constraint.
#[must_use]
pub fn compile_logs(filter: &LogsFilter) -> LogQuery {
    let mut query = LogQuery::new();

    let band_floor = filter
        .severity
        .as_deref()
        .and_then(Severity::from_name)
        .map(Severity::floor);
    if let Some(floor) = match (band_floor, filter.severity_min) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (floor, min) => floor.or(min),
    } {
        query = query.with_severity_min(floor);
    }

    if let Some(ref search) = filter.search {
        query = query.with_search(search.clone());
    }
    if let Some(ref trace_id) = filter.trace_id {
        query = query.with_trace_id(trace_id.clone());
    }
    if let Some(from) = filter.time_from {
        query = query.with_time_from(from);
    }
    if let Some(to) = filter.time_to {
        query = query.with_time_to(to);
    }
    if let Some(ref service) = filter.resource_service_name {
        query = query.with_resource_service(service.clone());
    }
    if let Some(ref scope) = filter.scope_name {
        query = query.with_scope_name(scope.clone());
    }

    query.with_limit(clamp_limit(filter.limit))
}

/// Compiles a traces filter into a store query.
///
/// `min_duration` is a legacy alias of `min_duration_ms`; the `_ms` field
/// wins when both are present. Unknown status names add no constraint.
#[must_use]
pub fn compile_traces(filter: &TracesFilter) -> SpanQuery {
    let mut query = SpanQuery::new();

    if let Some(ref service) = filter.service_name {
        query = query.with_resource_service(service.clone());
    }
    if let Some(ref operation) = filter.operation_name {
        query = query.with_name_contains(operation.clone());
    }
    if let Some(min) = filter.min_duration_ms.or(filter.min_duration) {
        query = query.with_min_duration_ms(min);
    }
    if let Some(max) = filter.max_duration {
        query = query.with_max_duration_ms(max);
    }
    if let Some(status) = filter.status_code.as_deref().and_then(SpanStatus::from_name) {
        query = query.with_status(status);
    }
    if let Some(from) = filter.time_from {
        query = query.with_time_from(from);
    }
    if let Some(to) = filter.time_to {
        query = query.with_time_to(to);
    }
    if let Some(ref trace_id) = filter.trace_id {
        query = query.with_trace_id(trace_id.clone());
    }

    query.with_limit(clamp_limit(filter.limit))
}

/// Compiles a metrics filter into a store query.
///
/// Unknown metric type names add no constraint.
#[must_use]
pub fn compile_metrics(filter: &MetricsFilter) -> MetricQuery {
    let mut query = MetricQuery::new();

    if let Some(ref name) = filter.metric_name {
        query = query.with_name_contains(name.clone());
    }
    if let Some(metric_type) = filter.metric_type.as_deref().and_then(MetricType::from_name) {
        query = query.with_type(metric_type);
    }
    if let Some(ref service) = filter.resource_service_name {
        query = query.with_resource_service(service.clone());
    }
    if let Some(from) = filter.time_from {
        query = query.with_time_from(from);
    }
    if let Some(to) = filter.time_to {
        query = query.with_time_to(to);
    }

    query.with_limit(clamp_limit(filter.limit))
}
