//! Log storage trait and implementations.
//!
//! Provides the `LogStore` trait for abstracting log row access and an
//! `InMemoryLogStore` implementation for development and testing. The
//! query engine only reads through this trait; the `insert*` methods are
//! the surface used by the external ingestion collaborator and by tests.

use crate::models::LogRecord;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors that can occur during log store operations.
///
/// Store errors are infrastructure failures: the caller may retry, the
/// engine itself never does.
#[derive(Debug, Error)]
pub enum LogStoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on log store")]
    LockError,

    /// Generic storage error.
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Compiled query parameters for retrieving logs.
///
/// Produced by [`crate::query::compile_logs`]; every bound is inclusive.
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    /// Inclusive lower bound on the event time.
    pub time_from: Option<DateTime<Utc>>,

    /// Inclusive upper bound on the event time.
    pub time_to: Option<DateTime<Utc>>,

    /// Inclusive floor on the severity number.
    pub severity_min: Option<i32>,

    /// Case-insensitive substring match on the rendered body text
    /// (substring, not fuzzy).
    pub search: Option<String>,

    /// Exact match on the trace id.
    pub trace_id: Option<String>,

    /// Exact match on the `service.name` resource attribute.
    pub resource_service: Option<String>,

    /// Exact match on the instrumentation scope name.
    pub scope_name: Option<String>,

    /// Maximum number of logs to return.
    pub limit: Option<usize>,

    /// Number of logs to skip (for pagination).
    pub offset: Option<usize>,
}

impl LogQuery {
    /// Creates a new empty query (returns all logs).
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

    /// Sets the severity floor.
    #[must_use]
    pub fn with_severity_min(mut self, severity_min: i32) -> Self {
        self.severity_min = Some(severity_min);
        self
    }

    /// Sets the body substring filter.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Sets the trace id filter (exact match).
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Sets the resource service name filter (exact match).
    #[must_use]
    pub fn with_resource_service(mut self, service: impl Into<String>) -> Self {
        self.resource_service = Some(service.into());
        self
    }

    /// Sets the scope name filter (exact match).
    #[must_use]
    pub fn with_scope_name(mut self, scope_name: impl Into<String>) -> Self {
        self.scope_name = Some(scope_name.into());
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

    /// Returns true if the record matches every present constraint.
    fn matches(&self, log: &LogRecord) -> bool {
        if let Some(from) = self.time_from {
            if log.time < from {
                return false;
            }
        }
        if let Some(to) = self.time_to {
            if log.time > to {
                return false;
            }
        }
        if let Some(min) = self.severity_min {
            if log.severity_number < min {
                return false;
            }
        }
        if let Some(ref trace_id) = self.trace_id {
            if log.trace_id_hex.as_deref() != Some(trace_id.as_str()) {
                return false;
            }
        }
        if let Some(ref service) = self.resource_service {
            if log.service_name() != Some(service.as_str()) {
                return false;
            }
        }
        if let Some(ref scope) = self.scope_name {
            if log.scope_name.as_deref() != Some(scope.as_str()) {
                return false;
            }
        }
        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            if !log.body_text().to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// Result of a log query operation.
#[derive(Debug, Clone)]
pub struct LogQueryResult {
    /// The logs matching the query, newest first.
    pub logs: Vec<LogRecord>,

    /// Total count of matching logs (before limit/offset applied).
    pub total_count: usize,
}

/// Trait for log storage implementations.
///
/// Implementations must be thread-safe (Send + Sync); the engine issues
/// concurrent reads without further coordination.
pub trait LogStore: Send + Sync {
    /// Inserts a single log record (ingestion-collaborator surface).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert(&self, record: LogRecord) -> Result<(), LogStoreError>;

    /// Inserts multiple log records.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_batch(&self, records: Vec<LogRecord>) -> Result<(), LogStoreError>;

    /// Finds logs matching the compiled query, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn find(&self, query: &LogQuery) -> Result<LogQueryResult, LogStoreError>;

    /// Returns the total number of logs in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the count operation fails.
    fn count(&self) -> Result<usize, LogStoreError>;

    /// Clears all logs from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the clear operation fails.
    fn clear(&self) -> Result<(), LogStoreError>;
}

/// In-memory log store implementation.
///
/// Stores records in a `Vec` behind a `RwLock`. Suitable for development,
/// testing, and single-node deployments with limited data volumes; data is
/// not persisted across restarts.
#[derive(Debug, Default)]
pub struct InMemoryLogStore {
    logs: Arc<RwLock<Vec<LogRecord>>>,
}

impl InMemoryLogStore {
    /// Creates a new empty in-memory log store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            logs: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Creates a new in-memory log store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl LogStore for InMemoryLogStore {
    fn insert(&self, record: LogRecord) -> Result<(), LogStoreError> {
        let mut logs = self.logs.write().map_err(|_| LogStoreError::LockError)?;
        logs.push(record);
        Ok(())
    }

    fn insert_batch(&self, records: Vec<LogRecord>) -> Result<(), LogStoreError> {
        let mut logs = self.logs.write().map_err(|_| LogStoreError::LockError)?;
        logs.extend(records);
        Ok(())
    }

    fn find(&self, query: &LogQuery) -> Result<LogQueryResult, LogStoreError> {
        let logs = self.logs.read().map_err(|_| LogStoreError::LockError)?;

        let mut matching: Vec<LogRecord> = logs
            .iter()
            .filter(|log| query.matches(log))
            .cloned()
            .collect();

        // Newest first; stable sort keeps insertion order for ties.
        matching.sort_by(|a, b| b.time.cmp(&a.time));

        let total_count = matching.len();
        let offset = query.offset.unwrap_or(0);
        let result: Vec<LogRecord> = matching
            .into_iter()
            .skip(offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(LogQueryResult {
            logs: result,
            total_count,
        })
    }

    fn count(&self) -> Result<usize, LogStoreError> {
        let logs = self.logs.read().map_err(|_| LogStoreError::LockError)?;
        Ok(logs.len())
    }

    fn clear(&self) -> Result<(), LogStoreError> {
        let mut logs = self.logs.write().map_err(|_| LogStoreError::LockError)?;
        logs.clear();
        Ok(())
    }
}
