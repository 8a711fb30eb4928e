//! Domain aggregation over raw telemetry rows.
//!
//! The stores return flat, filtered rows; this module turns them into the
//! derived shapes the dashboard renders:
//!
//! - [`trace_group`] - spans grouped into traces with span trees and
//!   timeline layout
//! - [`histogram`] - histogram samples merged into one distribution
//! - [`overview`] - rolling-window health summary helpers

pub mod histogram;
pub mod overview;
pub mod trace_group;

pub use histogram::{aggregate_histograms, HistogramData};
pub use overview::{
    error_rate, group_messages, mean_duration_ms, normalize_message, window_start,
    MessageSummary, OverviewSnapshot, OVERVIEW_WINDOW_HOURS, SLOW_SPAN_THRESHOLD_MS,
};
pub use trace_group::{group_spans, TraceGroup, TraceSpan, MIN_SPAN_WIDTH};
