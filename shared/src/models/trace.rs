//! Span data model.
//!
//! Defines the `SpanRecord` structure: one stored row per span of a
//! distributed trace. Grouping rows into traces and building span trees is
//! the job of [`crate::aggregate::trace_group`].

use crate::models::attribute::{AttributeMap, AttributeValue};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Status code of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpanStatus {
    /// No status was recorded.
    #[default]
    Unset,
    /// The span completed without error.
    Ok,
    /// The span encountered an error.
    Error,
}

impl std::fmt::Display for SpanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unset => write!(f, "UNSET"),
            Self::Ok => write!(f, "OK"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl SpanStatus {
    /// Parses a status from its wire name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_uppercase().as_str() {
            "UNSET" => Some(Self::Unset),
            "OK" => Some(Self::Ok),
            "ERROR" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Kind of span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpanKind {
    /// Default span kind (internal operation).
    #[default]
    Internal,
    /// The span represents a server handling a request.
    Server,
    /// The span represents a client making a request.
    Client,
    /// The span represents a producer sending a message.
    Producer,
    /// The span represents a consumer receiving a message.
    Consumer,
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Internal => write!(f, "INTERNAL"),
            Self::Server => write!(f, "SERVER"),
            Self::Client => write!(f, "CLIENT"),
            Self::Producer => write!(f, "PRODUCER"),
            Self::Consumer => write!(f, "CONSUMER"),
        }
    }
}

/// A stored span row.
///
/// Trace and span identifiers are opaque lowercase hex strings; the engine
/// matches them by equality and never assumes a fixed length. A span whose
/// `parent_span_id_hex` is absent - or refers to a span id that was never
/// ingested - is a root span of its trace.
///
/// # Example
///
/// ```
/// use shared::models::{SpanRecord, SpanKind, SpanStatus};
///
/// let span = SpanRecord::new("row-1", "0af7651916cd43dd", "b7ad6b7169203331", "GET /api/users")
///     .with_kind(SpanKind::Server)
///     .with_status(SpanStatus::Ok);
///
/// assert!(span.is_root());
/// assert!(span.validate_record().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SpanRecord {
    /// Opaque unique identifier of the stored row.
    #[validate(length(min = 1, message = "Record id cannot be empty"))]
    pub id: String,

    /// Hex-encoded trace id this span belongs to.
    #[validate(length(min = 1, message = "Trace id cannot be empty"))]
    pub trace_id_hex: String,

    /// Hex-encoded span id, unique within the trace.
    #[validate(length(min = 1, message = "Span id cannot be empty"))]
    pub span_id_hex: String,

    /// Hex-encoded parent span id (None for root spans).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id_hex: Option<String>,

    /// The operation name of this span.
    #[validate(length(min = 1, message = "Span name cannot be empty"))]
    pub name: String,

    /// The kind of span.
    #[serde(default)]
    pub kind: SpanKind,

    /// Timestamp when the span started.
    pub start_time: DateTime<Utc>,

    /// Timestamp when the span ended.
    pub end_time: DateTime<Utc>,

    /// The status of the span.
    #[serde(default)]
    pub status_code: SpanStatus,

    /// Optional human-readable status message (usually set on errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,

    /// Per-span attributes.
    #[serde(default)]
    pub attributes: AttributeMap,

    /// Attributes of the emitting resource (process/service).
    #[serde(default)]
    pub resource_attributes: AttributeMap,

    /// Name of the instrumentation scope that produced the span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_name: Option<String>,
}

/// Errors that can occur during span validation.
#[derive(Debug, Error)]
pub enum SpanValidationError {
    /// The record id is empty.
    #[error("Record id cannot be empty")]
    EmptyId,

    /// The trace id is empty.
    #[error("Trace id cannot be empty")]
    EmptyTraceId,

    /// The span id is empty.
    #[error("Span id cannot be empty")]
    EmptySpanId,

    /// The span name is empty.
    #[error("Span name cannot be empty")]
    EmptyName,

    /// The end time is before the start time.
    #[error("End time cannot be before start time")]
    InvalidTimeRange,

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl SpanRecord {
    /// Creates a new span with the current time as both start and end.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        trace_id_hex: impl Into<String>,
        span_id_hex: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            trace_id_hex: trace_id_hex.into(),
            span_id_hex: span_id_hex.into(),
            parent_span_id_hex: None,
            name: name.into(),
            kind: SpanKind::default(),
            start_time: now,
            end_time: now,
            status_code: SpanStatus::default(),
            status_message: None,
            attributes: AttributeMap::new(),
            resource_attributes: AttributeMap::new(),
            scope_name: None,
        }
    }

    /// Sets the parent span id.
    #[must_use]
    pub fn with_parent(mut self, parent_span_id_hex: impl Into<String>) -> Self {
        self.parent_span_id_hex = Some(parent_span_id_hex.into());
        self
    }

    /// Sets the span kind.
    #[must_use]
    pub fn with_kind(mut self, kind: SpanKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the span status.
    #[must_use]
    pub fn with_status(mut self, status: SpanStatus) -> Self {
        self.status_code = status;
        self
    }

    /// Sets the status message.
    #[must_use]
    pub fn with_status_message(mut self, message: impl Into<String>) -> Self {
        self.status_message = Some(message.into());
        self
    }

    /// Sets the start time.
    #[must_use]
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    /// Sets the end time.
    #[must_use]
    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = end_time;
        self
    }

    /// Sets start and end from a start time and a duration in milliseconds.
    #[must_use]
    pub fn with_window(mut self, start_time: DateTime<Utc>, duration_ms: i64) -> Self {
        self.start_time = start_time;
        self.end_time = start_time + Duration::milliseconds(duration_ms);
        self
    }

    /// Adds a per-span attribute.
    #[must_use]
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Adds a resource attribute.
    #[must_use]
    pub fn with_resource_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.resource_attributes.insert(key.into(), value.into());
        self
    }

    /// Returns the span duration in floating-point milliseconds.
    ///
    /// Derived from `end_time - start_time` at microsecond precision, so
    /// sub-millisecond spans keep a non-zero duration.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        let delta = self.end_time - self.start_time;
        delta.num_microseconds().map_or_else(
            || {
                #[allow(clippy::cast_precision_loss)]
                let ms = delta.num_milliseconds() as f64;
                ms
            },
            |us| {
                #[allow(clippy::cast_precision_loss)]
                let us = us as f64;
                us / 1000.0
            },
        )
    }

    /// Returns true if this span has no parent reference at all.
    ///
    /// Note that a span with a dangling parent reference is also treated
    /// as a root during trace grouping; that resolution needs the whole
    /// group and lives in [`crate::aggregate::trace_group`].
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_span_id_hex
            .as_deref()
            .is_none_or(str::is_empty)
    }

    /// Returns true if the span ended with ERROR status.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status_code == SpanStatus::Error
    }

    /// Returns the `service.name` resource attribute, if present.
    #[must_use]
    pub fn service_name(&self) -> Option<&str> {
        self.resource_attributes
            .get("service.name")
            .and_then(AttributeValue::as_str)
    }

    /// Validates the span.
    ///
    /// # Errors
    ///
    /// Returns an error if any identifier or the name is empty, or if the
    /// end time is before the start time.
    pub fn validate_record(&self) -> Result<(), SpanValidationError> {
        if self.id.is_empty() {
            return Err(SpanValidationError::EmptyId);
        }
        if self.trace_id_hex.is_empty() {
            return Err(SpanValidationError::EmptyTraceId);
        }
        if self.span_id_hex.is_empty() {
            return Err(SpanValidationError::EmptySpanId);
        }
        if self.name.is_empty() {
            return Err(SpanValidationError::EmptyName);
        }
        if self.end_time < self.start_time {
            return Err(SpanValidationError::InvalidTimeRange);
        }
        self.validate()?;
        Ok(())
    }
}
