//! Request-level filter objects.
//!
//! These are the option structs the dashboard client sends with each query.
//! They are constructed per-request, never persisted, and deserialize
//! directly from HTTP query strings. An absent field means "no constraint";
//! the compiler in [`super::compile`] never substitutes defaults for absent
//! constraint fields.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Filter for log queries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsFilter {
    /// Severity band name ("error", "warn", ...); compiles to an
    /// inclusive floor on the severity number, i.e. "this level and above".
    pub severity: Option<String>,

    /// Inclusive floor on the severity number (1-24).
    pub severity_min: Option<i32>,

    /// Case-insensitive substring match on the rendered log body.
    pub search: Option<String>,

    /// Exact trace id to correlate on.
    pub trace_id: Option<String>,

    /// Inclusive lower bound on the event time.
    pub time_from: Option<DateTime<Utc>>,

    /// Inclusive upper bound on the event time.
    pub time_to: Option<DateTime<Utc>>,

    /// Exact match on the `service.name` resource attribute.
    pub resource_service_name: Option<String>,

    /// Exact match on the instrumentation scope name.
    pub scope_name: Option<String>,

    /// Maximum number of records to return.
    pub limit: Option<i64>,
}

/// Filter for trace (span) queries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TracesFilter {
    /// Exact match on the `service.name` resource attribute.
    pub service_name: Option<String>,

    /// Case-insensitive substring match on the span name.
    pub operation_name: Option<String>,

    /// Inclusive lower bound on the span duration in milliseconds
    /// (legacy alias of `min_duration_ms`).
    pub min_duration: Option<f64>,

    /// Inclusive lower bound on the span duration in milliseconds.
    pub min_duration_ms: Option<f64>,

    /// Inclusive upper bound on the span duration in milliseconds.
    pub max_duration: Option<f64>,

    /// Span status name ("OK", "ERROR", "UNSET").
    pub status_code: Option<String>,

    /// Inclusive lower bound on the span start time.
    pub time_from: Option<DateTime<Utc>>,

    /// Inclusive upper bound on the span start time.
    pub time_to: Option<DateTime<Utc>>,

    /// Exact trace id to correlate on.
    pub trace_id: Option<String>,

    /// Maximum number of records to return.
    pub limit: Option<i64>,
}

/// Filter for metric queries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsFilter {
    /// Case-insensitive substring match on the metric name.
    pub metric_name: Option<String>,

    /// Metric type name ("gauge", "sum", "histogram", ...).
    pub metric_type: Option<String>,

    /// Exact match on the `service.name` resource attribute.
    pub resource_service_name: Option<String>,

    /// Inclusive lower bound on the latest sample time.
    pub time_from: Option<DateTime<Utc>>,

    /// Inclusive upper bound on the latest sample time.
    pub time_to: Option<DateTime<Utc>>,

    /// Maximum number of records to return.
    pub limit: Option<i64>,
}

impl LogsFilter {
    /// Returns a filter constrained to a single trace id, keeping every
    /// other field untouched.
    #[must_use]
    pub fn for_trace(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: Some(trace_id.into()),
            ..Self::default()
        }
    }
}
