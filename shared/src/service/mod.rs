//! Read-only query service facade.
//!
//! [`QueryService`] is the engine's entry point: it compiles request
//! filters, delegates to the record stores, and post-processes rows into
//! the response shapes the dashboard consumes. It never mutates store
//! state; ingestion is a separate collaborator writing through the store
//! traits directly.
//!
//! Every method is independent and requires no shared mutable state, so a
//! service handle can be cloned across any number of concurrent request
//! handlers.

use crate::aggregate::{
    aggregate_histograms, error_rate, group_messages, mean_duration_ms, window_start,
    HistogramData, OverviewSnapshot, SLOW_SPAN_THRESHOLD_MS,
};
use crate::models::{LogRecord, MetricRecord, SpanRecord, ERROR_SEVERITY_FLOOR};
use crate::query::{
    compile_logs, compile_metrics, compile_traces, LogsFilter, MetricsFilter, TracesFilter,
};
use crate::storage::{
    LogQuery, LogStore, LogStoreError, MetricStore, MetricStoreError, SpanQuery, SpanStore,
    SpanStoreError,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the query service.
///
/// Store variants are infrastructure failures: the caller may retry them.
/// `TraceNotFound` is a plain "no data" outcome; retrying will not help.
/// The HTTP layer uses [`QueryError::is_retryable`] to pick the status
/// code, so the consuming UI shows a retry affordance only where it makes
/// sense.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The log store failed.
    #[error(transparent)]
    LogStore(#[from] LogStoreError),

    /// The span store failed.
    #[error(transparent)]
    SpanStore(#[from] SpanStoreError),

    /// The metric store failed.
    #[error(transparent)]
    MetricStore(#[from] MetricStoreError),

    /// No span row matches the requested trace id.
    #[error("Trace not found: {0}")]
    TraceNotFound(String),
}

impl QueryError {
    /// Returns true for infrastructure failures worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::TraceNotFound(_))
    }
}

/// A page of log records with the filtered total for pagination.
#[derive(Debug, Clone)]
pub struct LogsPage {
    /// The returned records, newest first.
    pub logs: Vec<LogRecord>,
    /// Total records matching the filter, not just this page.
    pub count: usize,
}

/// A page of span records with the filtered total for pagination.
#[derive(Debug, Clone)]
pub struct SpansPage {
    /// The returned span rows, newest first.
    pub spans: Vec<SpanRecord>,
    /// Total records matching the filter, not just this page.
    pub count: usize,
}

/// A page of metric records with the filtered total for pagination.
#[derive(Debug, Clone)]
pub struct MetricsPage {
    /// The returned records, newest first.
    pub metrics: Vec<MetricRecord>,
    /// Total records matching the filter, not just this page.
    pub count: usize,
}

/// The read-only query facade over the record stores.
#[derive(Clone)]
pub struct QueryService {
    logs: Arc<dyn LogStore>,
    spans: Arc<dyn SpanStore>,
    metrics: Arc<dyn MetricStore>,
}

impl QueryService {
    /// Creates a service over the given stores.
    #[must_use]
    pub fn new(
        logs: Arc<dyn LogStore>,
        spans: Arc<dyn SpanStore>,
        metrics: Arc<dyn MetricStore>,
    ) -> Self {
        Self {
            logs,
            spans,
            metrics,
        }
    }

    /// Returns logs matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the log store fails.
    pub fn logs(&self, filter: &LogsFilter) -> Result<LogsPage, QueryError> {
        let query = compile_logs(filter);
        let result = self.logs.find(&query)?;
        tracing::debug!(count = result.total_count, "log query executed");
        Ok(LogsPage {
            logs: result.logs,
            count: result.total_count,
        })
    }

    /// Returns all logs correlated to one trace id.
    ///
    /// Convenience wrapper over [`QueryService::logs`] with the trace id
    /// forced; an unknown trace id yields an empty page.
    ///
    /// # Errors
    ///
    /// Returns an error if the log store fails.
    pub fn logs_for_trace(&self, trace_id: &str) -> Result<LogsPage, QueryError> {
        self.logs(&LogsFilter::for_trace(trace_id))
    }

    /// Returns flat span rows matching the filter, newest first.
    ///
    /// Grouping spans into traces is the consumer's concern, applied via
    /// [`crate::aggregate::group_spans`]; the row order returned here is
    /// what makes that grouping's first-appearance order deterministic.
    ///
    /// # Errors
    ///
    /// Returns an error if the span store fails.
    pub fn traces(&self, filter: &TracesFilter) -> Result<SpansPage, QueryError> {
        let query = compile_traces(filter);
        let result = self.spans.find(&query)?;
        tracing::debug!(count = result.total_count, "span query executed");
        Ok(SpansPage {
            spans: result.spans,
            count: result.total_count,
        })
    }

    /// Returns all spans of one trace.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::TraceNotFound`] when no span row carries the
    /// id, or a store error if the lookup fails.
    pub fn trace_by_id(&self, trace_id: &str) -> Result<Vec<SpanRecord>, QueryError> {
        let spans = self.spans.trace(trace_id)?;
        if spans.is_empty() {
            return Err(QueryError::TraceNotFound(trace_id.to_string()));
        }
        Ok(spans)
    }

    /// Returns metrics matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the metric store fails.
    pub fn metrics(&self, filter: &MetricsFilter) -> Result<MetricsPage, QueryError> {
        let query = compile_metrics(filter);
        let result = self.metrics.find(&query)?;
        tracing::debug!(count = result.total_count, "metric query executed");
        Ok(MetricsPage {
            metrics: result.metrics,
            count: result.total_count,
        })
    }

    /// Aggregates every histogram sample of one metric name into a single
    /// distribution for the dashboard chart.
    ///
    /// Returns `Ok(None)` when the name is unknown or carries no
    /// well-formed histogram sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the metric store fails.
    pub fn metric_histogram(&self, name: &str) -> Result<Option<HistogramData>, QueryError> {
        let query = crate::storage::MetricQuery::new().with_name_contains(name);
        let result = self.metrics.find(&query)?;
        let series: Vec<MetricRecord> = result
            .metrics
            .into_iter()
            .filter(|m| m.name.eq_ignore_ascii_case(name))
            .collect();
        Ok(aggregate_histograms(&series))
    }

    /// Computes the health overview snapshot for the window ending now.
    ///
    /// # Errors
    ///
    /// Returns an error if any store fails.
    pub fn overview(&self) -> Result<OverviewSnapshot, QueryError> {
        self.overview_at(Utc::now())
    }

    /// Computes the health overview snapshot for the 24h window ending at
    /// `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if any store fails.
    pub fn overview_at(&self, now: DateTime<Utc>) -> Result<OverviewSnapshot, QueryError> {
        let from = window_start(now);

        let total_logs = self.logs.count()?;
        let total_spans = self.spans.span_count()?;
        let total_traces = self.spans.trace_count()?;
        let total_metrics = self.metrics.count()?;

        // All spans of the window: rate, mean duration, and slow-span
        // grouping come from one pass over this set.
        let window_spans = self
            .spans
            .find(&SpanQuery::new().with_time_from(from).with_time_to(now))?
            .spans;

        let errored = window_spans.iter().filter(|s| s.is_error()).count();
        let durations: Vec<f64> = window_spans.iter().map(SpanRecord::duration_ms).collect();

        let slow_spans_24h = group_messages(
            window_spans
                .iter()
                .filter(|s| s.duration_ms() > SLOW_SPAN_THRESHOLD_MS)
                .map(|s| (s.name.clone(), s.start_time)),
        );

        // Error messages merge two sources: error-severity logs and
        // ERROR-status spans.
        let error_logs = self
            .logs
            .find(
                &LogQuery::new()
                    .with_severity_min(ERROR_SEVERITY_FLOOR)
                    .with_time_from(from)
                    .with_time_to(now),
            )?
            .logs;

        let recent_errors_24h = group_messages(
            error_logs
                .iter()
                .map(|log| (log.body_text(), log.time))
                .chain(window_spans.iter().filter(|s| s.is_error()).map(|s| {
                    (
                        s.status_message.clone().unwrap_or_else(|| s.name.clone()),
                        s.start_time,
                    )
                })),
        );

        tracing::debug!(
            active_spans = window_spans.len(),
            errors = recent_errors_24h.len(),
            "overview computed"
        );

        Ok(OverviewSnapshot {
            total_logs,
            total_traces,
            total_spans,
            total_metrics,
            error_rate: error_rate(errored, window_spans.len()),
            avg_response_time_ms: mean_duration_ms(&durations),
            active_spans: window_spans.len(),
            recent_errors_24h,
            slow_spans_24h,
        })
    }
}
