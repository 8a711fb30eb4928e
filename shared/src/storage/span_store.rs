//! Span storage trait and implementations.
//!
//! Provides the `SpanStore` trait for abstracting span row access and an
//! `InMemorySpanStore` implementation for development and testing. Rows
//! are stored flat - one row per span - because grouping spans into traces
//! is an aggregation concern handled downstream by
//! [`crate::aggregate::trace_group`].

use crate::models::{SpanRecord, SpanStatus};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors that can occur during span store operations.
#[derive(Debug, Error)]
pub enum SpanStoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on span store")]
    LockError,

    /// Generic storage error.
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Compiled query parameters for retrieving spans.
///
/// Produced by [`crate::query::compile_traces`]; every bound is inclusive.
/// Duration bounds apply to the derived `duration_ms` of each span.
#[derive(Debug, Clone, Default)]
pub struct SpanQuery {
    /// Inclusive lower bound on the span start time.
    pub time_from: Option<DateTime<Utc>>,

    /// Inclusive upper bound on the span start time.
    pub time_to: Option<DateTime<Utc>>,

    /// Exact match on the trace id.
    pub trace_id: Option<String>,

    /// Case-insensitive substring match on the span name.
    pub name_contains: Option<String>,

    /// Exact match on the `service.name` resource attribute.
    pub resource_service: Option<String>,

    /// Filter by span status.
    pub status: Option<SpanStatus>,

    /// Inclusive lower bound on the span duration in milliseconds.
    pub min_duration_ms: Option<f64>,

    /// Inclusive upper bound on the span duration in milliseconds.
    pub max_duration_ms: Option<f64>,

    /// Maximum number of spans to return.
    pub limit: Option<usize>,

    /// Number of spans to skip (for pagination).
    pub offset: Option<usize>,
}

impl SpanQuery {
    /// Creates a new empty query (returns all spans).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inclusive lower time bound.
    #[must_use]
    pub fn with_time_from(mut self, from: DateTime<Utc>) -> Self {
        self.time_from = Some(from);
        self
    }

    /// Sets the inclusive upper time bound.
    #[must_use]
    pub fn with_time_to(mut self, to: DateTime<Utc>) -> Self {
        self.time_to = Some(to);
        self
    }

    /// Sets the trace id filter (exact match).
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Sets the span name substring filter.
    #[must_use]
    pub fn with_name_contains(mut self, name: impl Into<String>) -> Self {
        self.name_contains = Some(name.into());
        self
    }

    /// Sets the resource service name filter (exact match).
    #[must_use]
    pub fn with_resource_service(mut self, service: impl Into<String>) -> Self {
        self.resource_service = Some(service.into());
        self
    }

    /// Sets the status filter.
    #[must_use]
    pub fn with_status(mut self, status: SpanStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the minimum duration filter.
    #[must_use]
    pub fn with_min_duration_ms(mut self, ms: f64) -> Self {
        self.min_duration_ms = Some(ms);
        self
    }

    /// Sets the maximum duration filter.
    #[must_use]
    pub fn with_max_duration_ms(mut self, ms: f64) -> Self {
        self.max_duration_ms = Some(ms);
        self
    }

    /// Sets the maximum number of results.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the offset for pagination.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if the span matches every present constraint.
    fn matches(&self, span: &SpanRecord) -> bool {
        if let Some(from) = self.time_from {
            if span.start_time < from {
                return false;
            }
        }
        if let Some(to) = self.time_to {
            if span.start_time > to {
                return false;
            }
        }
        if let Some(ref trace_id) = self.trace_id {
            if &span.trace_id_hex != trace_id {
                return false;
            }
        }
        if let Some(ref name) = self.name_contains {
            let needle = name.to_lowercase();
            if !span.name.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if let Some(ref service) = self.resource_service {
            if span.service_name() != Some(service.as_str()) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if span.status_code != status {
                return false;
            }
        }
        let duration = span.duration_ms();
        if let Some(min) = self.min_duration_ms {
            if duration < min {
                return false;
            }
        }
        if let Some(max) = self.max_duration_ms {
            if duration > max {
                return false;
            }
        }
        true
    }
}

/// Result of a span query operation.
#[derive(Debug, Clone)]
pub struct SpanQueryResult {
    /// The spans matching the query, newest first.
    pub spans: Vec<SpanRecord>,

    /// Total count of matching spans (before limit/offset applied).
    pub total_count: usize,
}

/// Trait for span storage implementations.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait SpanStore: Send + Sync {
    /// Inserts a single span row (ingestion-collaborator surface).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_span(&self, span: SpanRecord) -> Result<(), SpanStoreError>;

    /// Inserts multiple span rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_spans(&self, spans: Vec<SpanRecord>) -> Result<(), SpanStoreError>;

    /// Finds spans matching the compiled query, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn find(&self, query: &SpanQuery) -> Result<SpanQueryResult, SpanStoreError>;

    /// Returns all spans of one trace in insertion order.
    ///
    /// An unknown trace id yields an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn trace(&self, trace_id: &str) -> Result<Vec<SpanRecord>, SpanStoreError>;

    /// Returns the total number of span rows in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the count operation fails.
    fn span_count(&self) -> Result<usize, SpanStoreError>;

    /// Returns the number of distinct trace ids in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the count operation fails.
    fn trace_count(&self) -> Result<usize, SpanStoreError>;

    /// Clears all spans from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the clear operation fails.
    fn clear(&self) -> Result<(), SpanStoreError>;
}

/// In-memory span store implementation.
#[derive(Debug, Default)]
pub struct InMemorySpanStore {
    spans: Arc<RwLock<Vec<SpanRecord>>>,
}

impl InMemorySpanStore {
    /// Creates a new empty in-memory span store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            spans: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Creates a new in-memory span store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl SpanStore for InMemorySpanStore {
    fn insert_span(&self, span: SpanRecord) -> Result<(), SpanStoreError> {
        let mut spans = self.spans.write().map_err(|_| SpanStoreError::LockError)?;
        spans.push(span);
        Ok(())
    }

    fn insert_spans(&self, new_spans: Vec<SpanRecord>) -> Result<(), SpanStoreError> {
        let mut spans = self.spans.write().map_err(|_| SpanStoreError::LockError)?;
        spans.extend(new_spans);
        Ok(())
    }

    fn find(&self, query: &SpanQuery) -> Result<SpanQueryResult, SpanStoreError> {
        let spans = self.spans.read().map_err(|_| SpanStoreError::LockError)?;

        let mut matching: Vec<SpanRecord> = spans
            .iter()
            .filter(|span| query.matches(span))
            .cloned()
            .collect();

        // Newest first; stable sort keeps insertion order for ties so the
        // grouping "first appearance" tie-break stays deterministic.
        matching.sort_by(|a, b| b.start_time.cmp(&a.start_time));

        let total_count = matching.len();
        let offset = query.offset.unwrap_or(0);
        let result: Vec<SpanRecord> = matching
            .into_iter()
            .skip(offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(SpanQueryResult {
            spans: result,
            total_count,
        })
    }

    fn trace(&self, trace_id: &str) -> Result<Vec<SpanRecord>, SpanStoreError> {
        let spans = self.spans.read().map_err(|_| SpanStoreError::LockError)?;
        Ok(spans
            .iter()
            .filter(|span| span.trace_id_hex == trace_id)
            .cloned()
            .collect())
    }

    fn span_count(&self) -> Result<usize, SpanStoreError> {
        let spans = self.spans.read().map_err(|_| SpanStoreError::LockError)?;
        Ok(spans.len())
    }

    fn trace_count(&self) -> Result<usize, SpanStoreError> {
        let spans = self.spans.read().map_err(|_| SpanStoreError::LockError)?;
        let distinct: HashSet<&str> = spans.iter().map(|s| s.trace_id_hex.as_str()).collect();
        Ok(distinct.len())
    }

    fn clear(&self) -> Result<(), SpanStoreError> {
        let mut spans = self.spans.write().map_err(|_| SpanStoreError::LockError)?;
        spans.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn span(id: &str, trace: &str, span_id: &str, name: &str) -> SpanRecord {
        SpanRecord::new(id, trace, span_id, name)
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = InMemorySpanStore::new();
        assert_eq!(store.span_count().unwrap(), 0);
        assert_eq!(store.trace_count().unwrap(), 0);
    }

    #[test]
    fn test_trace_count_is_distinct() {
        let store = InMemorySpanStore::new();
        store.insert_span(span("r1", "t1", "s1", "a")).unwrap();
        store.insert_span(span("r2", "t1", "s2", "b")).unwrap();
        store.insert_span(span("r3", "t2", "s3", "c")).unwrap();

        assert_eq!(store.span_count().unwrap(), 3);
        assert_eq!(store.trace_count().unwrap(), 2);
    }

    #[test]
    fn test_trace_returns_all_spans_in_order() {
        let store = InMemorySpanStore::new();
        store.insert_span(span("r1", "t1", "s1", "root")).unwrap();
        store.insert_span(span("r2", "t2", "s9", "other")).unwrap();
        store
            .insert_span(span("r3", "t1", "s2", "child").with_parent("s1"))
            .unwrap();

        let trace = store.trace("t1").unwrap();

        assert_eq!(trace.len(), 2);
        assert_eq!(trace[0].span_id_hex, "s1");
        assert_eq!(trace[1].span_id_hex, "s2");
    }

    #[test]
    fn test_trace_unknown_id_is_empty() {
        let store = InMemorySpanStore::new();
        assert!(store.trace("missing").unwrap().is_empty());
    }

    #[test]
    fn test_find_by_status() {
        let store = InMemorySpanStore::new();
        store
            .insert_span(span("r1", "t1", "s1", "ok").with_status(SpanStatus::Ok))
            .unwrap();
        store
            .insert_span(span("r2", "t2", "s2", "boom").with_status(SpanStatus::Error))
            .unwrap();

        let result = store
            .find(&SpanQuery::new().with_status(SpanStatus::Error))
            .unwrap();

        assert_eq!(result.total_count, 1);
        assert_eq!(result.spans[0].name, "boom");
    }

    #[test]
    fn test_find_by_duration_bounds() {
        let store = InMemorySpanStore::new();
        let t0 = Utc::now();
        store
            .insert_span(span("r1", "t1", "s1", "fast").with_window(t0, 10))
            .unwrap();
        store
            .insert_span(span("r2", "t2", "s2", "slow").with_window(t0, 1500))
            .unwrap();

        let result = store
            .find(&SpanQuery::new().with_min_duration_ms(1000.0))
            .unwrap();
        assert_eq!(result.total_count, 1);
        assert_eq!(result.spans[0].name, "slow");

        let result = store
            .find(&SpanQuery::new().with_max_duration_ms(100.0))
            .unwrap();
        assert_eq!(result.total_count, 1);
        assert_eq!(result.spans[0].name, "fast");
    }

    #[test]
    fn test_find_by_name_substring() {
        let store = InMemorySpanStore::new();
        store
            .insert_span(span("r1", "t1", "s1", "GET /api/users"))
            .unwrap();
        store
            .insert_span(span("r2", "t2", "s2", "SELECT orders"))
            .unwrap();

        let result = store
            .find(&SpanQuery::new().with_name_contains("api"))
            .unwrap();

        assert_eq!(result.total_count, 1);
        assert_eq!(result.spans[0].span_id_hex, "s1");
    }

    #[test]
    fn test_find_newest_first_with_limit() {
        let store = InMemorySpanStore::new();
        let t0 = Utc::now();
        for i in 0..5 {
            store
                .insert_span(
                    span(&format!("r{i}"), &format!("t{i}"), &format!("s{i}"), "op")
                        .with_window(t0 + Duration::seconds(i), 50),
                )
                .unwrap();
        }

        let result = store.find(&SpanQuery::new().with_limit(2)).unwrap();

        assert_eq!(result.total_count, 5);
        assert_eq!(result.spans.len(), 2);
        assert_eq!(result.spans[0].id, "r4");
    }
}
