//! Integration tests for log querying.
//!
//! Tests cover:
//! - Filtering by severity floor, search text, and trace id
//! - Pagination counts reflecting the filtered total
//! - The per-trace log view
//! - Empty stores returning empty results, not errors

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use shared::models::{LogRecord, Severity};

use super::common::{get, test_app};

#[tokio::test]
async fn test_query_logs_with_filters() {
    let (app, state) = test_app();
    let now = Utc::now();

    state
        .log_store()
        .insert_batch(vec![
            LogRecord::new("l1", Severity::Info, "server started").with_time(now),
            LogRecord::new("l2", Severity::Warn, "high memory usage").with_time(now),
            LogRecord::new("l3", Severity::Error, "request failed: timeout")
                .with_time(now)
                .with_trace_id("trace-1"),
            LogRecord::new("l4", Severity::Fatal, "panic in handler").with_time(now),
        ])
        .unwrap();

    // Severity floor: error and above.
    let (status, response) = get(app.clone(), "/api/observability/logs?severity_min=17").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["count"], 2);

    // Band name maps to the same floor.
    let (_, by_name) = get(app.clone(), "/api/observability/logs?severity=error").await;
    assert_eq!(by_name["count"], 2);

    // Case-insensitive substring search.
    let (_, searched) = get(app.clone(), "/api/observability/logs?search=TIMEOUT").await;
    assert_eq!(searched["count"], 1);
    assert_eq!(searched["logs"][0]["id"], "l3");

    // Exact trace id match.
    let (_, correlated) = get(app, "/api/observability/logs?trace_id=trace-1").await;
    assert_eq!(correlated["count"], 1);
    assert_eq!(correlated["logs"][0]["id"], "l3");
}

#[tokio::test]
async fn test_query_logs_default_limit_bounds_page_not_count() {
    let (app, state) = test_app();
    let now = Utc::now();

    let records: Vec<LogRecord> = (0..120)
        .map(|i| {
            LogRecord::new(format!("l{i}"), Severity::Info, "tick")
                .with_time(now + Duration::milliseconds(i))
        })
        .collect();
    state.log_store().insert_batch(records).unwrap();

    let (status, response) = get(app, "/api/observability/logs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["count"], 120);
    assert_eq!(response["logs"].as_array().unwrap().len(), 100);
}

#[tokio::test]
async fn test_query_logs_newest_first() {
    let (app, state) = test_app();
    let now = Utc::now();

    state
        .log_store()
        .insert_batch(vec![
            LogRecord::new("old", Severity::Info, "old").with_time(now - Duration::minutes(10)),
            LogRecord::new("new", Severity::Info, "new").with_time(now),
        ])
        .unwrap();

    let (_, response) = get(app, "/api/observability/logs").await;

    assert_eq!(response["logs"][0]["id"], "new");
    assert_eq!(response["logs"][1]["id"], "old");
}

#[tokio::test]
async fn test_logs_for_trace_endpoint() {
    let (app, state) = test_app();

    state
        .log_store()
        .insert_batch(vec![
            LogRecord::new("l1", Severity::Info, "span started").with_trace_id("trace-42"),
            LogRecord::new("l2", Severity::Error, "span failed").with_trace_id("trace-42"),
            LogRecord::new("l3", Severity::Info, "unrelated").with_trace_id("other"),
        ])
        .unwrap();

    let (status, response) = get(app, "/api/observability/traces/trace-42/logs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["count"], 2);
    for log in response["logs"].as_array().unwrap() {
        assert_eq!(log["trace_id_hex"], "trace-42");
    }
}

#[tokio::test]
async fn test_empty_log_store_returns_empty_results() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/api/observability/logs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["count"], 0);
    assert_eq!(response["logs"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_negative_limit_clamps_instead_of_failing() {
    let (app, state) = test_app();

    state
        .log_store()
        .insert_batch(vec![
            LogRecord::new("l1", Severity::Info, "a"),
            LogRecord::new("l2", Severity::Info, "b"),
        ])
        .unwrap();

    let (status, response) = get(app, "/api/observability/logs?limit=-3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["logs"].as_array().unwrap().len(), 1);
    assert_eq!(response["count"], 2);
}
