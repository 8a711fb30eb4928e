//! Integration tests for the health overview endpoint.
//!
//! Tests cover:
//! - Totals across all three stores
//! - 24h window filtering for errors and slow spans
//! - Error message grouping ordered by count
//! - Zero-division guards on rates with no data

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use shared::models::{LogRecord, Severity, SpanRecord, SpanStatus};

use super::common::{get, test_app};

#[tokio::test]
async fn test_overview_on_empty_stores() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/api/observability/overview").await;

    assert_eq!(status, StatusCode::OK);
    let overview = &response["overview"];
    assert_eq!(overview["total_logs"], 0);
    assert_eq!(overview["total_traces"], 0);
    assert_eq!(overview["total_spans"], 0);
    assert_eq!(overview["total_metrics"], 0);
    assert_eq!(overview["error_rate"], 0.0);
    assert_eq!(overview["avg_response_time_ms"], 0.0);
    assert_eq!(overview["active_spans"], 0);
}

#[tokio::test]
async fn test_overview_groups_recent_errors_by_count() {
    let (app, state) = test_app();
    let now = Utc::now();

    let mut records = Vec::new();
    for i in 0..5 {
        records.push(
            LogRecord::new(format!("t{i}"), Severity::Error, "timeout")
                .with_time(now - Duration::hours(1)),
        );
    }
    for i in 0..2 {
        records.push(
            LogRecord::new(format!("c{i}"), Severity::Error, "connection refused")
                .with_time(now - Duration::hours(2)),
        );
    }
    // Below the error floor: excluded.
    records.push(
        LogRecord::new("w1", Severity::Warn, "slow response").with_time(now - Duration::hours(1)),
    );
    // Outside the 24h window: excluded.
    records.push(
        LogRecord::new("old", Severity::Error, "timeout").with_time(now - Duration::hours(48)),
    );
    state.log_store().insert_batch(records).unwrap();

    let (status, response) = get(app, "/api/observability/overview").await;

    assert_eq!(status, StatusCode::OK);
    let errors = response["overview"]["recent_errors_24h"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["message"], "timeout");
    assert_eq!(errors[0]["count"], 5);
    assert_eq!(errors[1]["message"], "connection refused");
    assert_eq!(errors[1]["count"], 2);
}

#[tokio::test]
async fn test_overview_slow_spans_and_rates() {
    let (app, state) = test_app();
    let now = Utc::now();
    let recent = now - Duration::minutes(30);

    state
        .span_store()
        .insert_spans(vec![
            SpanRecord::new("r1", "t1", "s1", "checkout").with_window(recent, 1500),
            SpanRecord::new("r2", "t2", "s2", "checkout").with_window(recent, 2500),
            SpanRecord::new("r3", "t3", "s3", "login")
                .with_window(recent, 100)
                .with_status(SpanStatus::Error)
                .with_status_message("session expired"),
            SpanRecord::new("r4", "t4", "s4", "login").with_window(recent, 300),
        ])
        .unwrap();

    let (status, response) = get(app, "/api/observability/overview").await;

    assert_eq!(status, StatusCode::OK);
    let overview = &response["overview"];

    assert_eq!(overview["total_spans"], 4);
    assert_eq!(overview["total_traces"], 4);
    assert_eq!(overview["active_spans"], 4);
    assert_eq!(overview["error_rate"], 0.25);
    assert_eq!(overview["avg_response_time_ms"], 1100.0);

    let slow = overview["slow_spans_24h"].as_array().unwrap();
    assert_eq!(slow.len(), 1);
    assert_eq!(slow[0]["message"], "checkout");
    assert_eq!(slow[0]["count"], 2);

    // The errored span surfaces through its status message.
    let errors = overview["recent_errors_24h"].as_array().unwrap();
    assert_eq!(errors[0]["message"], "session expired");
}

#[tokio::test]
async fn test_overview_merges_log_and_span_errors() {
    let (app, state) = test_app();
    let now = Utc::now();

    state
        .log_store()
        .insert(
            LogRecord::new("l1", Severity::Error, "db timeout").with_time(now - Duration::hours(1)),
        )
        .unwrap();
    state
        .span_store()
        .insert_span(
            SpanRecord::new("r1", "t1", "s1", "query users")
                .with_window(now - Duration::hours(1), 50)
                .with_status(SpanStatus::Error)
                .with_status_message("db timeout"),
        )
        .unwrap();

    let (_, response) = get(app, "/api/observability/overview").await;

    // One log and one span with the same message group together.
    let errors = response["overview"]["recent_errors_24h"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["message"], "db timeout");
    assert_eq!(errors[0]["count"], 2);
}
