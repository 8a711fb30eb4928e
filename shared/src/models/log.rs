//! Log record data model.
//!
//! Defines the core `LogRecord` structure for stored OpenTelemetry log rows
//! and the `Severity` bands of the 1-24 severity number scale.

use crate::models::attribute::{AttributeMap, AttributeValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Severity number at or above which a log record counts as an error.
pub const ERROR_SEVERITY_FLOOR: i32 = 17;

/// Log severity band.
///
/// Each band covers four numbers of the OpenTelemetry severity scale
/// (TRACE=1..4, DEBUG=5..8, INFO=9..12, WARN=13..16, ERROR=17..20,
/// FATAL=21..24).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Detailed trace information (1-4).
    Trace,
    /// Debug information (5-8).
    Debug,
    /// Informational messages (9-12).
    Info,
    /// Warning conditions (13-16).
    Warn,
    /// Error conditions (17-20).
    Error,
    /// Critical/fatal conditions (21-24).
    Fatal,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::Info
    }
}

impl Severity {
    /// Maps a severity number (1-24) to its band.
    ///
    /// Numbers outside the scale clamp to the nearest band.
    #[must_use]
    pub fn from_number(number: i32) -> Self {
        match number {
            i32::MIN..=4 => Self::Trace,
            5..=8 => Self::Debug,
            9..=12 => Self::Info,
            13..=16 => Self::Warn,
            17..=20 => Self::Error,
            _ => Self::Fatal,
        }
    }

    /// Parses a band from its lowercase name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            "fatal" | "critical" => Some(Self::Fatal),
            _ => None,
        }
    }

    /// Returns the lowest severity number of this band.
    ///
    /// Used to compile "this level and above" filters: `Error.floor()` is
    /// 17, so `severity_number >= 17` matches ERROR and FATAL records.
    #[must_use]
    pub fn floor(self) -> i32 {
        match self {
            Self::Trace => 1,
            Self::Debug => 5,
            Self::Info => 9,
            Self::Warn => 13,
            Self::Error => 17,
            Self::Fatal => 21,
        }
    }
}

/// A stored log record.
///
/// Records are created by the telemetry ingestion collaborator and are
/// immutable afterwards; the query engine only ever reads them. Trace and
/// span correlation ids are opaque lowercase hex strings matched by value
/// equality, never resolved as foreign keys.
///
/// # Example
///
/// ```
/// use shared::models::{LogRecord, Severity};
///
/// let log = LogRecord::new("log-1", Severity::Error, "connection refused")
///     .with_trace_id("0af7651916cd43dd8448eb211c80319c")
///     .with_attribute("peer", "db:5432");
///
/// assert!(log.is_error());
/// assert_eq!(log.body_text(), "connection refused");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogRecord {
    /// Opaque unique identifier of the stored row.
    #[validate(length(min = 1, message = "Record id cannot be empty"))]
    pub id: String,

    /// Timestamp when the log event occurred.
    pub time: DateTime<Utc>,

    /// Severity number on the OpenTelemetry 1-24 scale.
    pub severity_number: i32,

    /// Optional display label for the severity ("ERROR", "WARN", ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity_text: Option<String>,

    /// The log body: a string or structured value, possibly absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<AttributeValue>,

    /// Per-record attributes.
    #[serde(default)]
    pub attributes: AttributeMap,

    /// Hex-encoded trace id for correlation, if the record was emitted
    /// inside a traced request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id_hex: Option<String>,

    /// Hex-encoded span id for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id_hex: Option<String>,

    /// Attributes of the emitting resource (process/service).
    #[serde(default)]
    pub resource_attributes: AttributeMap,

    /// Name of the instrumentation scope that produced the record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_name: Option<String>,

    /// Timestamp when the event was observed by the collector.
    pub observed_time: DateTime<Utc>,

    /// W3C trace flags bitmask, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_flags: Option<u32>,

    /// Number of attributes dropped at ingestion.
    #[serde(default)]
    pub dropped_attributes_count: u32,
}

/// Errors that can occur during log record validation.
#[derive(Debug, Error)]
pub enum LogValidationError {
    /// The record id is empty.
    #[error("Record id cannot be empty")]
    EmptyId,

    /// The severity number is outside the 1-24 scale.
    #[error("Severity number {0} is outside the 1-24 scale")]
    SeverityOutOfRange(i32),

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl LogRecord {
    /// Creates a new log record with the current timestamp.
    ///
    /// The severity number is set to the floor of the given band and the
    /// severity text to its display name.
    #[must_use]
    pub fn new(id: impl Into<String>, severity: Severity, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            time: now,
            severity_number: severity.floor(),
            severity_text: Some(severity.to_string().to_uppercase()),
            body: Some(AttributeValue::Str(body.into())),
            attributes: AttributeMap::new(),
            trace_id_hex: None,
            span_id_hex: None,
            resource_attributes: AttributeMap::new(),
            scope_name: None,
            observed_time: now,
            trace_flags: None,
            dropped_attributes_count: 0,
        }
    }

    /// Sets the event timestamp (and observed time, if still at default).
    #[must_use]
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self.observed_time = time;
        self
    }

    /// Sets the severity number directly.
    #[must_use]
    pub fn with_severity_number(mut self, number: i32) -> Self {
        self.severity_number = number;
        self
    }

    /// Adds a per-record attribute.
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

    /// Sets the trace id for correlation.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id_hex: impl Into<String>) -> Self {
        self.trace_id_hex = Some(trace_id_hex.into());
        self
    }

    /// Sets the span id for correlation.
    #[must_use]
    pub fn with_span_id(mut self, span_id_hex: impl Into<String>) -> Self {
        self.span_id_hex = Some(span_id_hex.into());
        self
    }

    /// Sets the instrumentation scope name.
    #[must_use]
    pub fn with_scope_name(mut self, scope_name: impl Into<String>) -> Self {
        self.scope_name = Some(scope_name.into());
        self
    }

    /// Returns the severity band of this record.
    #[must_use]
    pub fn severity(&self) -> Severity {
        Severity::from_number(self.severity_number)
    }

    /// Returns true if this record is at ERROR severity or above.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity_number >= ERROR_SEVERITY_FLOOR
    }

    /// Renders the body as display text.
    ///
    /// String bodies render as-is; structured bodies render as compact
    /// JSON; an absent body renders as the empty string. This is the text
    /// used for substring search and error-message grouping.
    #[must_use]
    pub fn body_text(&self) -> String {
        self.body
            .as_ref()
            .map(AttributeValue::display_text)
            .unwrap_or_default()
    }

    /// Returns the `service.name` resource attribute, if present.
    #[must_use]
    pub fn service_name(&self) -> Option<&str> {
        self.resource_attributes
            .get("service.name")
            .and_then(AttributeValue::as_str)
    }

    /// Validates the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or the severity number is
    /// outside the 1-24 scale.
    pub fn validate_record(&self) -> Result<(), LogValidationError> {
        if self.id.is_empty() {
            return Err(LogValidationError::EmptyId);
        }
        if !(1..=24).contains(&self.severity_number) {
            return Err(LogValidationError::SeverityOutOfRange(self.severity_number));
        }
        self.validate()?;
        Ok(())
    }
}
