//! Metric data model.
//!
//! Defines the `MetricRecord` structure for stored metric rows and the
//! polymorphic histogram sample shapes found in the wild: the modern
//! `bucket_counts`/`explicit_bounds` form and the legacy cumulative
//! `buckets` form. Both are modelled as one tagged variant so the
//! aggregator in [`crate::aggregate::histogram`] can resolve the shape once
//! and operate on a canonical representation.

use crate::models::attribute::{AttributeMap, AttributeValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Type of metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    /// A point-in-time value that can go up or down.
    Gauge,
    /// A monotonically accumulating value.
    Sum,
    /// A distribution over explicit bucket boundaries.
    Histogram,
    /// A distribution over exponential bucket boundaries.
    ExponentialHistogram,
    /// Pre-computed quantile summaries.
    Summary,
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gauge => write!(f, "gauge"),
            Self::Sum => write!(f, "sum"),
            Self::Histogram => write!(f, "histogram"),
            Self::ExponentialHistogram => write!(f, "exponential_histogram"),
            Self::Summary => write!(f, "summary"),
        }
    }
}

impl Default for MetricType {
    fn default() -> Self {
        Self::Gauge
    }
}

impl MetricType {
    /// Parses a metric type from its wire name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gauge" => Some(Self::Gauge),
            "sum" | "counter" => Some(Self::Sum),
            "histogram" => Some(Self::Histogram),
            "exponential_histogram" => Some(Self::ExponentialHistogram),
            "summary" => Some(Self::Summary),
            _ => None,
        }
    }
}

/// A cumulative bucket of the legacy histogram wire format.
///
/// `count` is the number of observations at or below the `le` boundary;
/// the final boundary is the literal string `"+Inf"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyBucket {
    /// Upper boundary as a string ("10", "250", "+Inf", ...).
    pub le: String,
    /// Cumulative observation count at or below the boundary.
    pub count: u64,
}

/// A histogram sample in either of the two wire shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistogramSample {
    /// Modern shape: per-bucket counts aligned to strictly ascending
    /// explicit boundaries, with an implicit final +Infinity bucket.
    Modern {
        /// Per-bucket observation counts; one more entry than bounds.
        bucket_counts: Vec<u64>,
        /// Strictly ascending bucket boundaries.
        explicit_bounds: Vec<f64>,
        /// Sum of all observed values.
        sum: f64,
        /// Total number of observations.
        count: u64,
    },
    /// Legacy shape: cumulative counts keyed by boundary string.
    Legacy {
        /// Cumulative buckets, ascending by boundary with "+Inf" last.
        buckets: Vec<LegacyBucket>,
    },
}

impl HistogramSample {
    /// Returns true if the sample satisfies its shape invariants.
    ///
    /// Modern: `bucket_counts.len() == explicit_bounds.len() + 1`.
    /// Legacy: non-empty, boundaries ascending ("+Inf" last), cumulative
    /// counts monotonically non-decreasing. Malformed samples are skipped
    /// during aggregation rather than aborting the whole response.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        match self {
            Self::Modern {
                bucket_counts,
                explicit_bounds,
                ..
            } => bucket_counts.len() == explicit_bounds.len() + 1,
            Self::Legacy { buckets } => {
                if buckets.is_empty() {
                    return false;
                }
                let mut prev_bound = f64::NEG_INFINITY;
                let mut prev_count = 0_u64;
                for bucket in buckets {
                    let bound = parse_le(&bucket.le);
                    let Some(bound) = bound else {
                        return false;
                    };
                    if bound <= prev_bound || bucket.count < prev_count {
                        return false;
                    }
                    prev_bound = bound;
                    prev_count = bucket.count;
                }
                true
            }
        }
    }
}

/// Parses a legacy boundary string into a sortable number.
///
/// `"+Inf"` (any case) maps to positive infinity so it sorts last.
#[must_use]
pub fn parse_le(le: &str) -> Option<f64> {
    if le.eq_ignore_ascii_case("+inf") || le.eq_ignore_ascii_case("inf") {
        return Some(f64::INFINITY);
    }
    le.parse::<f64>().ok()
}

/// One sample of a metric's time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// The sampled value: a plain number, or histogram data for
    /// histogram-typed metrics.
    pub value: SampleValue,
    /// Timestamp of the sample.
    pub time: DateTime<Utc>,
    /// Optional exemplar attached to the sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exemplar: Option<AttributeValue>,
}

/// The value of a metric sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    /// A plain numeric sample (gauges, sums, summaries).
    Number(f64),
    /// A histogram sample in either wire shape.
    Histogram(HistogramSample),
}

impl SampleValue {
    /// Returns the numeric value if this is a plain sample.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Histogram(_) => None,
        }
    }

    /// Returns the histogram sample if this is one.
    #[must_use]
    pub fn as_histogram(&self) -> Option<&HistogramSample> {
        match self {
            Self::Number(_) => None,
            Self::Histogram(h) => Some(h),
        }
    }
}

/// A stored metric row with its recent samples.
///
/// # Example
///
/// ```
/// use shared::models::{MetricRecord, MetricType};
///
/// let metric = MetricRecord::new("m-1", "http_request_duration_ms", MetricType::Histogram)
///     .with_unit("ms")
///     .with_description("Server request latency");
///
/// assert!(metric.validate_record().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MetricRecord {
    /// Opaque unique identifier of the stored row.
    #[validate(length(min = 1, message = "Record id cannot be empty"))]
    pub id: String,

    /// The metric name (e.g. "`http_requests_total`").
    #[validate(length(min = 1, message = "Metric name cannot be empty"))]
    pub name: String,

    /// The type of metric.
    #[serde(rename = "type")]
    pub metric_type: MetricType,

    /// Optional unit of the metric ("ms", "bytes", ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Optional description of the metric.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Most recent plain value (for histograms, the latest sum).
    pub latest_value: f64,

    /// Timestamp of the most recent sample.
    pub latest_time: DateTime<Utc>,

    /// Per-metric attributes.
    #[serde(default)]
    pub attributes: AttributeMap,

    /// Attributes of the emitting resource (process/service).
    #[serde(default)]
    pub resource_attributes: AttributeMap,

    /// Name of the instrumentation scope that produced the metric.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_name: Option<String>,

    /// Recent samples, oldest first.
    #[serde(default)]
    pub data: Vec<MetricSample>,
}

/// Errors that can occur during metric validation.
#[derive(Debug, Error)]
pub enum MetricValidationError {
    /// The record id is empty.
    #[error("Record id cannot be empty")]
    EmptyId,

    /// The metric name is empty.
    #[error("Metric name cannot be empty")]
    EmptyName,

    /// A histogram sample violates its shape invariants.
    #[error("Malformed histogram sample at index {0}")]
    MalformedHistogramSample(usize),

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl MetricRecord {
    /// Creates a new metric record with the current timestamp and no
    /// samples.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, metric_type: MetricType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            metric_type,
            unit: None,
            description: None,
            latest_value: 0.0,
            latest_time: Utc::now(),
            attributes: AttributeMap::new(),
            resource_attributes: AttributeMap::new(),
            scope_name: None,
            data: Vec::new(),
        }
    }

    /// Sets the unit.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
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

    /// Appends a plain numeric sample and refreshes the latest value/time.
    #[must_use]
    pub fn with_sample(mut self, value: f64, time: DateTime<Utc>) -> Self {
        self.data.push(MetricSample {
            value: SampleValue::Number(value),
            time,
            exemplar: None,
        });
        self.latest_value = value;
        self.latest_time = time;
        self
    }

    /// Appends a histogram sample and refreshes the latest value/time.
    ///
    /// For the modern shape the latest value becomes the sample sum.
    #[must_use]
    pub fn with_histogram_sample(mut self, sample: HistogramSample, time: DateTime<Utc>) -> Self {
        if let HistogramSample::Modern { sum, .. } = &sample {
            self.latest_value = *sum;
        }
        self.data.push(MetricSample {
            value: SampleValue::Histogram(sample),
            time,
            exemplar: None,
        });
        self.latest_time = time;
        self
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
    /// Returns an error if the id or name is empty, or if any histogram
    /// sample is malformed.
    pub fn validate_record(&self) -> Result<(), MetricValidationError> {
        if self.id.is_empty() {
            return Err(MetricValidationError::EmptyId);
        }
        if self.name.is_empty() {
            return Err(MetricValidationError::EmptyName);
        }
        for (index, sample) in self.data.iter().enumerate() {
            if let SampleValue::Histogram(h) = &sample.value {
                if !h.is_well_formed() {
                    return Err(MetricValidationError::MalformedHistogramSample(index));
                }
            }
        }
        self.validate()?;
        Ok(())
    }
}
