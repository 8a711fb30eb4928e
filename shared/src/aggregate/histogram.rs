//! Histogram aggregation.
//!
//! Merges histogram samples from multiple metric rows into one combined
//! distribution. Two wire shapes exist: the modern
//! `bucket_counts`/`explicit_bounds` form (index-aligned merge) and the
//! legacy cumulative `buckets` form (key-aligned by boundary string, then
//! differenced into per-bucket counts).
//!
//! Known constraint: bucket boundaries are not reconciled across samples.
//! The first well-formed sample fixes the canonical shape and every later
//! sample is merged index-aligned against it, which assumes a uniform
//! bucket schema per metric name.

use crate::models::{metric::parse_le, HistogramSample, MetricRecord, SampleValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A combined histogram distribution.
///
/// Always in the normalized modern shape: per-bucket counts aligned to
/// ascending boundaries with an implicit final +Infinity bucket, so
/// `bucket_counts.len() == explicit_bounds.len() + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramData {
    /// Per-bucket observation counts.
    pub bucket_counts: Vec<u64>,
    /// Ascending bucket boundaries.
    pub explicit_bounds: Vec<f64>,
    /// Sum of all observed values (0 when the legacy shape, which does
    /// not carry a sum, was aggregated).
    pub sum: f64,
    /// Total number of observations.
    pub count: u64,
}

/// Merges the histogram samples of the given metric rows into one
/// distribution.
///
/// Returns `None` when the input is empty or no row carries a well-formed
/// histogram sample. Malformed samples - and samples in the other wire
/// shape than the first well-formed one - are skipped so partial bad input
/// never aborts the whole response.
#[must_use]
pub fn aggregate_histograms(records: &[MetricRecord]) -> Option<HistogramData> {
    let samples: Vec<&HistogramSample> = records
        .iter()
        .flat_map(|record| record.data.iter())
        .filter_map(|sample| match &sample.value {
            SampleValue::Histogram(h) if h.is_well_formed() => Some(h),
            _ => None,
        })
        .collect();

    match samples.first()? {
        HistogramSample::Modern { .. } => aggregate_modern(&samples),
        HistogramSample::Legacy { .. } => aggregate_legacy(&samples),
    }
}

/// Index-aligned merge of modern samples.
///
/// The first sample fixes the accumulator shape; later samples add into
/// matching indices only.
fn aggregate_modern(samples: &[&HistogramSample]) -> Option<HistogramData> {
    let (first_counts, first_bounds) = samples.iter().find_map(|s| match s {
        HistogramSample::Modern {
            bucket_counts,
            explicit_bounds,
            ..
        } => Some((bucket_counts, explicit_bounds)),
        HistogramSample::Legacy { .. } => None,
    })?;

    let mut bucket_counts = vec![0_u64; first_counts.len()];
    let explicit_bounds = first_bounds.clone();
    let mut total_sum = 0.0;
    let mut total_count = 0_u64;

    for sample in samples {
        let HistogramSample::Modern {
            bucket_counts: counts,
            sum,
            count,
            ..
        } = sample
        else {
            continue;
        };
        for (accumulator, value) in bucket_counts.iter_mut().zip(counts.iter()) {
            *accumulator += value;
        }
        total_sum += sum;
        total_count += count;
    }

    Some(HistogramData {
        bucket_counts,
        explicit_bounds,
        sum: total_sum,
        count: total_count,
    })
}

/// Key-aligned merge of legacy cumulative samples.
///
/// Cumulative counts accumulate per distinct `le` boundary (so samples
/// with heterogeneous bucket ordering still merge), are sorted ascending
/// with `"+Inf"` last, and are then differenced into per-bucket counts.
fn aggregate_legacy(samples: &[&HistogramSample]) -> Option<HistogramData> {
    let mut cumulative: HashMap<String, u64> = HashMap::new();

    for sample in samples {
        let HistogramSample::Legacy { buckets } = sample else {
            continue;
        };
        for bucket in buckets {
            *cumulative.entry(bucket.le.clone()).or_insert(0) += bucket.count;
        }
    }
    if cumulative.is_empty() {
        return None;
    }

    let mut merged: Vec<(f64, u64)> = cumulative
        .into_iter()
        .filter_map(|(le, count)| parse_le(&le).map(|bound| (bound, count)))
        .collect();
    merged.sort_by(|a, b| a.0.total_cmp(&b.0));

    // Difference consecutive cumulative counts into per-bucket counts;
    // the first bucket keeps its own cumulative count.
    let mut bucket_counts = Vec::with_capacity(merged.len());
    let mut explicit_bounds = Vec::with_capacity(merged.len().saturating_sub(1));
    let mut previous = 0_u64;
    let mut total_count = 0_u64;
    for (bound, count) in &merged {
        bucket_counts.push(count.saturating_sub(previous));
        previous = *count;
        total_count = total_count.max(*count);
        if bound.is_finite() {
            explicit_bounds.push(*bound);
        }
    }

    // Normalized shape wants one more count than bounds; a legacy series
    // missing its "+Inf" bucket gets an empty overflow bucket appended.
    if bucket_counts.len() == explicit_bounds.len() {
        bucket_counts.push(0);
    }

    Some(HistogramData {
        bucket_counts,
        explicit_bounds,
        sum: 0.0,
        count: total_count,
    })
}
