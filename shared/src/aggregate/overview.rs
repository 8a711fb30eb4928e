//! Health overview calculation.
//!
//! Pure helpers for the rolling-window health summary: grouping error
//! messages, counting slow spans, and computing rates with zero-division
//! guards. The [`crate::service::QueryService`] pulls the raw window data
//! from the stores and assembles the [`OverviewSnapshot`] from these
//! helpers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Length of the rolling health window.
pub const OVERVIEW_WINDOW_HOURS: i64 = 24;

/// Span duration above which a span counts as slow, in milliseconds.
pub const SLOW_SPAN_THRESHOLD_MS: f64 = 1000.0;

/// Placeholder used when an error record carries no message text.
const NO_MESSAGE: &str = "(no message)";

/// One grouped message line of the overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSummary {
    /// The normalized message text.
    pub message: String,
    /// Number of occurrences in the window.
    pub count: usize,
    /// Most recent occurrence in the window.
    pub last_seen: DateTime<Utc>,
}

/// The derived, non-persisted health snapshot served to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewSnapshot {
    /// Total stored log records.
    pub total_logs: usize,
    /// Total distinct traces.
    pub total_traces: usize,
    /// Total stored span rows.
    pub total_spans: usize,
    /// Total stored metric rows.
    pub total_metrics: usize,
    /// Errored-span fraction over the window (0 when no spans).
    pub error_rate: f64,
    /// Mean span duration over the window in milliseconds (0 when no
    /// spans).
    pub avg_response_time_ms: f64,
    /// Spans that started inside the window.
    pub active_spans: usize,
    /// Error messages seen in the window, grouped and ordered by count
    /// descending.
    pub recent_errors_24h: Vec<MessageSummary>,
    /// Slow spans (duration above [`SLOW_SPAN_THRESHOLD_MS`]) in the
    /// window, grouped by span name, ordered by count descending.
    pub slow_spans_24h: Vec<MessageSummary>,
}

/// Returns the inclusive start of the rolling window ending at `now`.
#[must_use]
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(OVERVIEW_WINDOW_HOURS)
}

/// Normalizes message text for grouping: trims whitespace and maps blank
/// messages to a stable placeholder.
#[must_use]
pub fn normalize_message(message: &str) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        NO_MESSAGE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Groups `(message, time)` occurrences into summaries.
///
/// Each distinct normalized message yields one summary with its
/// occurrence count and latest time. Ordering is count descending, then
/// message ascending for a deterministic tie-break.
pub fn group_messages(
    occurrences: impl IntoIterator<Item = (String, DateTime<Utc>)>,
) -> Vec<MessageSummary> {
    let mut grouped: HashMap<String, (usize, DateTime<Utc>)> = HashMap::new();

    for (message, time) in occurrences {
        let key = normalize_message(&message);
        grouped
            .entry(key)
            .and_modify(|(count, last_seen)| {
                *count += 1;
                if time > *last_seen {
                    *last_seen = time;
                }
            })
            .or_insert((1, time));
    }

    let mut summaries: Vec<MessageSummary> = grouped
        .into_iter()
        .map(|(message, (count, last_seen))| MessageSummary {
            message,
            count,
            last_seen,
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.message.cmp(&b.message)));
    summaries
}

/// Errored fraction with a zero-division guard.
///
/// Returns 0 (never NaN) when `total` is 0.
#[must_use]
pub fn error_rate(errored: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = errored as f64 / total as f64;
    rate
}

/// Mean of the given durations with a zero-division guard.
///
/// Returns 0 (never NaN) for an empty slice.
#[must_use]
pub fn mean_duration_ms(durations: &[f64]) -> f64 {
    if durations.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let len = durations.len() as f64;
    durations.iter().sum::<f64>() / len
}
