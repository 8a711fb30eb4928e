//! Sightline Shared Library
//!
//! This crate contains the query and aggregation engine of the Sightline
//! observability dashboard backend: data models for OpenTelemetry-shaped
//! logs, spans, and metrics, storage traits with in-memory implementations,
//! filter compilation, and the read-only [`service::QueryService`] facade.
//!
//! # Modules
//!
//! - [`models`] - Data models for logs, spans, and metrics
//! - [`storage`] - Storage traits and implementations
//! - [`query`] - Filter objects and the filter compiler
//! - [`aggregate`] - Trace grouping, histogram merging, overview calculation
//! - [`service`] - The read-only query service facade
//!
//! # Example
//!
//! ```
//! use shared::models::{LogRecord, Severity};
//!
//! let log = LogRecord::new("log-1", Severity::Error, "connection refused")
//!     .with_trace_id("0af7651916cd43dd8448eb211c80319c");
//!
//! assert!(log.is_error());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod aggregate;
pub mod models;
pub mod query;
pub mod service;
pub mod storage;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
