//! Trace grouping and span-tree building.
//!
//! Groups flat span rows by trace id, elects a root span, computes
//! parent/child depth, and derives per-trace aggregates plus a normalized
//! timeline layout for rendering.
//!
//! Spans are kept in an indexed arena with a separate parent-to-children
//! index; traversal carries a visited set, so malformed input with
//! dangling parent references or reference cycles degrades gracefully
//! instead of looping or crashing.

use crate::models::SpanRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Minimum rendered width of a span bar, as a fraction of the group
/// duration, so zero-length spans stay visible on the timeline.
pub const MIN_SPAN_WIDTH: f64 = 0.001;

/// A span placed in its trace tree.
#[derive(Debug, Clone, Serialize)]
pub struct TraceSpan {
    /// The underlying span row.
    #[serde(flatten)]
    pub record: SpanRecord,

    /// Distance from the root: root spans have depth 0, each resolvable
    /// child sits one below its parent.
    pub depth: usize,

    /// Horizontal start of the span bar as a fraction of the group
    /// duration (0.0 = group start).
    pub left: f64,

    /// Width of the span bar as a fraction of the group duration, floored
    /// at [`MIN_SPAN_WIDTH`].
    pub width: f64,
}

/// A derived, non-persisted trace aggregate: all spans sharing one trace
/// id, arranged as a tree.
#[derive(Debug, Clone, Serialize)]
pub struct TraceGroup {
    /// The shared trace id.
    pub trace_id_hex: String,

    /// Member spans in display order: ascending depth, then ascending
    /// start time.
    pub spans: Vec<TraceSpan>,

    /// Index into `spans` of the representative root span.
    pub root_index: usize,

    /// Number of member spans.
    pub span_count: usize,

    /// Number of member spans with ERROR status.
    pub error_count: usize,

    /// Maximum member duration in milliseconds.
    pub total_duration_ms: f64,

    /// Earliest member start time.
    pub start_time: DateTime<Utc>,

    /// Latest member end time.
    pub end_time: DateTime<Utc>,
}

impl TraceGroup {
    /// Builds a single trace group from the spans of one trace.
    ///
    /// Returns `None` for an empty input. The trace id is taken from the
    /// first span; callers partitioning mixed input should use
    /// [`group_spans`] instead.
    #[must_use]
    pub fn from_spans(spans: Vec<SpanRecord>) -> Option<Self> {
        if spans.is_empty() {
            return None;
        }

        let trace_id_hex = spans[0].trace_id_hex.clone();

        // Arena lookup: span id -> index. First occurrence wins on
        // duplicate span ids.
        let mut by_id: HashMap<&str, usize> = HashMap::with_capacity(spans.len());
        for (index, span) in spans.iter().enumerate() {
            by_id.entry(span.span_id_hex.as_str()).or_insert(index);
        }

        // A span is a root if it has no parent reference, or the
        // reference dangles (parent filtered out or never ingested).
        let mut roots: Vec<usize> = Vec::new();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); spans.len()];
        for (index, span) in spans.iter().enumerate() {
            let parent = span
                .parent_span_id_hex
                .as_deref()
                .filter(|p| !p.is_empty())
                .and_then(|p| by_id.get(p).copied())
                .filter(|&p| p != index);
            match parent {
                Some(parent_index) => children[parent_index].push(index),
                None => roots.push(index),
            }
        }

        // Representative root: earliest start among qualifying roots. A
        // group where every parent reference resolves (a cycle) has no
        // qualifying root; fall back to the earliest-starting span.
        roots.sort_by_key(|&i| spans[i].start_time);
        let root_id = roots.first().map_or_else(
            || earliest_index(&spans),
            |&index| index,
        );

        // Depth-first from each root, visited-guarded. Spans unreachable
        // from any root (cycle members) are promoted to depth-0 roots in
        // earliest-start order until every span is placed.
        let mut depth: Vec<usize> = vec![0; spans.len()];
        let mut visited: Vec<bool> = vec![false; spans.len()];
        let mut stack: Vec<(usize, usize)> = Vec::new();
        let mut queue: Vec<usize> = roots.clone();
        if queue.is_empty() {
            queue.push(root_id);
        }
        loop {
            for &root in &queue {
                if visited[root] {
                    continue;
                }
                stack.push((root, 0));
                while let Some((index, d)) = stack.pop() {
                    if visited[index] {
                        continue;
                    }
                    visited[index] = true;
                    depth[index] = d;
                    for &child in &children[index] {
                        if !visited[child] {
                            stack.push((child, d + 1));
                        }
                    }
                }
            }
            let mut unvisited: Vec<usize> =
                (0..spans.len()).filter(|&i| !visited[i]).collect();
            if unvisited.is_empty() {
                break;
            }
            unvisited.sort_by_key(|&i| spans[i].start_time);
            queue = vec![unvisited[0]];
        }

        let start_time = spans.iter().map(|s| s.start_time).min()?;
        let end_time = spans.iter().map(|s| s.end_time).max()?;
        let error_count = spans.iter().filter(|s| s.is_error()).count();
        let total_duration_ms = spans
            .iter()
            .map(SpanRecord::duration_ms)
            .fold(0.0_f64, f64::max);

        // Guard the layout denominator with a 1ms floor so degenerate
        // zero-duration groups still produce finite fractions.
        let group_duration_ms = ((end_time - start_time)
            .num_microseconds()
            .map_or(0.0, |us| {
                #[allow(clippy::cast_precision_loss)]
                let us = us as f64;
                us / 1000.0
            }))
        .max(1.0);

        let root_span_id = spans[root_id].span_id_hex.clone();
        let mut placed: Vec<TraceSpan> = spans
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let offset_ms = (record.start_time - start_time)
                    .num_microseconds()
                    .map_or(0.0, |us| {
                        #[allow(clippy::cast_precision_loss)]
                        let us = us as f64;
                        us / 1000.0
                    });
                let left = offset_ms / group_duration_ms;
                let width = (record.duration_ms() / group_duration_ms).max(MIN_SPAN_WIDTH);
                TraceSpan {
                    record,
                    depth: depth[index],
                    left,
                    width,
                }
            })
            .collect();

        // Display order: ascending depth, then ascending start time.
        placed.sort_by(|a, b| {
            a.depth
                .cmp(&b.depth)
                .then_with(|| a.record.start_time.cmp(&b.record.start_time))
        });
        let root_index = placed
            .iter()
            .position(|s| s.record.span_id_hex == root_span_id)
            .unwrap_or(0);

        Some(Self {
            trace_id_hex,
            span_count: placed.len(),
            error_count,
            total_duration_ms,
            start_time,
            end_time,
            root_index,
            spans: placed,
        })
    }

    /// Returns the representative root span.
    #[must_use]
    pub fn root_span(&self) -> &TraceSpan {
        &self.spans[self.root_index]
    }
}

/// Groups a flat, ordered span sequence into trace groups.
///
/// The grouping key is the trace id; groups appear in order of the first
/// appearance of their trace id in the input, so the caller's sort order
/// decides group order.
#[must_use]
pub fn group_spans(spans: Vec<SpanRecord>) -> Vec<TraceGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut partitions: HashMap<String, Vec<SpanRecord>> = HashMap::new();

    for span in spans {
        let key = span.trace_id_hex.clone();
        if !partitions.contains_key(&key) {
            order.push(key.clone());
        }
        partitions.entry(key).or_default().push(span);
    }

    order
        .into_iter()
        .filter_map(|trace_id| TraceGroup::from_spans(partitions.remove(&trace_id)?))
        .collect()
}

fn earliest_index(spans: &[SpanRecord]) -> usize {
    spans
        .iter()
        .enumerate()
        .min_by_key(|(_, span)| span.start_time)
        .map_or(0, |(index, _)| index)
}
