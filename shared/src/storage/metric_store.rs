//! Metric storage trait and implementations.
//!
//! Provides the `MetricStore` trait for abstracting metric row access and
//! an `InMemoryMetricStore` implementation for development and testing.

use crate::models::{MetricRecord, MetricType};
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors that can occur during metric store operations.
#[derive(Debug, Error)]
pub enum MetricStoreError {
    /// Failed to acquire lock on the store.
    #[error("Failed to acquire lock on metric store")]
    LockError,

    /// Generic storage error.
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Compiled query parameters for retrieving metrics.
///
/// Produced by [`crate::query::compile_metrics`]; time bounds are
/// inclusive and apply to the record's latest sample time.
#[derive(Debug, Clone, Default)]
pub struct MetricQuery {
    /// Case-insensitive substring match on the metric name.
    pub name_contains: Option<String>,

    /// Filter by metric type.
    pub metric_type: Option<MetricType>,

    /// Exact match on the `service.name` resource attribute.
    pub resource_service: Option<String>,

    /// Inclusive lower bound on the latest sample time.
    pub time_from: Option<DateTime<Utc>>,

    /// Inclusive upper bound on the latest sample time.
    pub time_to: Option<DateTime<Utc>>,

    /// Maximum number of metrics to return.
    pub limit: Option<usize>,

    /// Number of metrics to skip (for pagination).
    pub offset: Option<usize>,
}

impl MetricQuery {
    /// Creates a new empty query (returns all metrics).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the metric name substring filter.
    #[must_use]
    pub fn with_name_contains(mut self, name: impl Into<String>) -> Self {
        self.name_contains = Some(name.into());
        self
    }

    /// Sets the metric type filter.
    #[must_use]
    pub fn with_type(mut self, metric_type: MetricType) -> Self {
        self.metric_type = Some(metric_type);
        self
    }

    /// Sets the resource service name filter (exact match).
    #[must_use]
    pub fn with_resource_service(mut self, service: impl Into<String>) -> Self {
        self.resource_service = Some(service.into());
        self
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
    fn matches(&self, metric: &MetricRecord) -> bool {
        if let Some(ref name) = self.name_contains {
            let needle = name.to_lowercase();
            if !metric.name.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if let Some(metric_type) = self.metric_type {
            if metric.metric_type != metric_type {
                return false;
            }
        }
        if let Some(ref service) = self.resource_service {
            if metric.service_name() != Some(service.as_str()) {
                return false;
            }
        }
        if let Some(from) = self.time_from {
            if metric.latest_time < from {
                return false;
            }
        }
        if let Some(to) = self.time_to {
            if metric.latest_time > to {
                return false;
            }
        }
        true
    }
}

/// Result of a metric query operation.
#[derive(Debug, Clone)]
pub struct MetricQueryResult {
    /// The metrics matching the query, newest first.
    pub metrics: Vec<MetricRecord>,

    /// Total count of matching metrics (before limit/offset applied).
    pub total_count: usize,
}

/// Trait for metric storage implementations.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait MetricStore: Send + Sync {
    /// Inserts a single metric row (ingestion-collaborator surface).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert(&self, metric: MetricRecord) -> Result<(), MetricStoreError>;

    /// Inserts multiple metric rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn insert_batch(&self, metrics: Vec<MetricRecord>) -> Result<(), MetricStoreError>;

    /// Finds metrics matching the compiled query, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query operation fails.
    fn find(&self, query: &MetricQuery) -> Result<MetricQueryResult, MetricStoreError>;

    /// Returns the total number of metric rows in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the count operation fails.
    fn count(&self) -> Result<usize, MetricStoreError>;

    /// Clears all metrics from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the clear operation fails.
    fn clear(&self) -> Result<(), MetricStoreError>;
}

/// In-memory metric store implementation.
#[derive(Debug, Default)]
pub struct InMemoryMetricStore {
    metrics: Arc<RwLock<Vec<MetricRecord>>>,
}

impl InMemoryMetricStore {
    /// Creates a new empty in-memory metric store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Creates a new in-memory metric store wrapped in an Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl MetricStore for InMemoryMetricStore {
    fn insert(&self, metric: MetricRecord) -> Result<(), MetricStoreError> {
        let mut metrics = self
            .metrics
            .write()
            .map_err(|_| MetricStoreError::LockError)?;
        metrics.push(metric);
        Ok(())
    }

    fn insert_batch(&self, new_metrics: Vec<MetricRecord>) -> Result<(), MetricStoreError> {
        let mut metrics = self
            .metrics
            .write()
            .map_err(|_| MetricStoreError::LockError)?;
        metrics.extend(new_metrics);
        Ok(())
    }

    fn find(&self, query: &MetricQuery) -> Result<MetricQueryResult, MetricStoreError> {
        let metrics = self
            .metrics
            .read()
            .map_err(|_| MetricStoreError::LockError)?;

        let mut matching: Vec<MetricRecord> = metrics
            .iter()
            .filter(|metric| query.matches(metric))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.latest_time.cmp(&a.latest_time));

        let total_count = matching.len();
        let offset = query.offset.unwrap_or(0);
        let result: Vec<MetricRecord> = matching
            .into_iter()
            .skip(offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(MetricQueryResult {
            metrics: result,
            total_count,
        })
    }

    fn count(&self) -> Result<usize, MetricStoreError> {
        let metrics = self
            .metrics
            .read()
            .map_err(|_| MetricStoreError::LockError)?;
        Ok(metrics.len())
    }

    fn clear(&self) -> Result<(), MetricStoreError> {
        let mut metrics = self
            .metrics
            .write()
            .map_err(|_| MetricStoreError::LockError)?;
        metrics.clear();
        Ok(())
    }
}
