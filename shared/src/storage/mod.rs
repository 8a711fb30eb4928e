//! Storage traits and implementations.
//!
//! Each telemetry entity gets its own store trait (`LogStore`,
//! `SpanStore`, `MetricStore`) with a compiled query type and an in-memory
//! implementation. The query engine is strictly read-only against these
//! traits; the insert methods exist for the external ingestion
//! collaborator and for tests.

pub mod log_store;
pub mod metric_store;
pub mod span_store;

pub use log_store::{InMemoryLogStore, LogQuery, LogQueryResult, LogStore, LogStoreError};
pub use metric_store::{
    InMemoryMetricStore, MetricQuery, MetricQueryResult, MetricStore, MetricStoreError,
};
pub use span_store::{InMemorySpanStore, SpanQuery, SpanQueryResult, SpanStore, SpanStoreError};
