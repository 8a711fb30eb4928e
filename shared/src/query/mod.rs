//! Filter objects and the filter compiler.
//!
//! The dashboard sends plain option structs ([`LogsFilter`],
//! [`TracesFilter`], [`MetricsFilter`]); [`compile_logs`],
//! [`compile_traces`], and [`compile_metrics`] translate them into the
//! typed store queries of [`crate::storage`].
//!
//! # Example
//!
//! ```
//! use shared::query::{compile_logs, LogsFilter, DEFAULT_LIMIT};
//!
//! let query = compile_logs(&LogsFilter::default());
//! assert_eq!(query.limit, Some(DEFAULT_LIMIT));
//! assert!(query.severity_min.is_none());
//! ```

mod compile;
mod filter;

pub use compile::{clamp_limit, compile_logs, compile_metrics, compile_traces, DEFAULT_LIMIT};
pub use filter::{LogsFilter, MetricsFilter, TracesFilter};
