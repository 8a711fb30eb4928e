//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use shared::service::QueryService;
use shared::storage::{
    InMemoryLogStore, InMemoryMetricStore, InMemorySpanStore, LogStore, MetricStore, SpanStore,
};
use std::sync::Arc;

/// Application state shared across all request handlers.
///
/// Holds the storage backends and the read-only query service built over
/// them. Handlers go through the service; the raw store handles exist for
/// the ingestion collaborator and for seeding data in tests.
#[derive(Clone)]
pub struct AppState {
    log_store: Arc<dyn LogStore>,
    span_store: Arc<dyn SpanStore>,
    metric_store: Arc<dyn MetricStore>,
    service: QueryService,
}

impl AppState {
    /// Creates a new application state over the given stores.
    pub fn new(
        log_store: Arc<dyn LogStore>,
        span_store: Arc<dyn SpanStore>,
        metric_store: Arc<dyn MetricStore>,
    ) -> Self {
        let service = QueryService::new(
            log_store.clone(),
            span_store.clone(),
            metric_store.clone(),
        );
        Self {
            log_store,
            span_store,
            metric_store,
            service,
        }
    }

    /// Creates a new application state with in-memory stores.
    ///
    /// This is useful for development and testing.
    #[must_use]
    pub fn with_in_memory_store() -> Self {
        Self::new(
            InMemoryLogStore::new_shared(),
            InMemorySpanStore::new_shared(),
            InMemoryMetricStore::new_shared(),
        )
    }

    /// Returns the query service.
    #[must_use]
    pub fn service(&self) -> &QueryService {
        &self.service
    }

    /// Returns a reference to the log store.
    #[must_use]
    pub fn log_store(&self) -> &dyn LogStore {
        self.log_store.as_ref()
    }

    /// Returns a reference to the span store.
    #[must_use]
    pub fn span_store(&self) -> &dyn SpanStore {
        self.span_store.as_ref()
    }

    /// Returns a reference to the metric store.
    #[must_use]
    pub fn metric_store(&self) -> &dyn MetricStore {
        self.metric_store.as_ref()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_in_memory_store()
    }
}
