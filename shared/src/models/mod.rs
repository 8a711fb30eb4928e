//! Data models for the Sightline observability backend.
//!
//! This module contains the core data structures for logs, spans, and
//! metrics, plus the attribute value type shared by all three.

pub mod attribute;
pub mod log;
pub mod metric;
pub mod trace;

pub use attribute::{AttributeMap, AttributeValue};
pub use log::{LogRecord, LogValidationError, Severity, ERROR_SEVERITY_FLOOR};
pub use metric::{
    HistogramSample, LegacyBucket, MetricRecord, MetricSample, MetricType, MetricValidationError,
    SampleValue,
};
pub use trace::{SpanKind, SpanRecord, SpanStatus, SpanValidationError};
