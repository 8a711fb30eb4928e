//! Integration tests for trace querying.
//!
//! Tests cover:
//! - Flat span search with duration/status/operation filters
//! - The trace detail view with depth and timeline layout
//! - Root election with dangling parent references
//! - Error handling for non-existent traces

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use shared::models::{SpanRecord, SpanStatus};

use super::common::{get, test_app};

#[tokio::test]
async fn test_query_traces_flat_spans() {
    let (app, state) = test_app();
    let t0 = Utc::now() - Duration::minutes(5);

    state
        .span_store()
        .insert_spans(vec![
            SpanRecord::new("r1", "trace-1", "s1", "POST /orders").with_window(t0, 500),
            SpanRecord::new("r2", "trace-1", "s2", "INSERT INTO orders")
                .with_parent("s1")
                .with_window(t0 + Duration::milliseconds(20), 100),
            SpanRecord::new("r3", "trace-2", "s3", "GET /health")
                .with_window(t0 + Duration::seconds(1), 5),
        ])
        .unwrap();

    let (status, response) = get(app, "/api/observability/traces").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["count"], 3);
    let spans = response["traces"].as_array().unwrap();
    assert_eq!(spans.len(), 3);
    // Flat rows carry the derived duration.
    assert!(spans.iter().all(|s| s["duration_ms"].is_number()));
}

#[tokio::test]
async fn test_query_traces_by_duration_and_status() {
    let (app, state) = test_app();
    let t0 = Utc::now() - Duration::minutes(5);

    state
        .span_store()
        .insert_spans(vec![
            SpanRecord::new("r1", "fast", "s1", "fast op").with_window(t0, 10),
            SpanRecord::new("r2", "slow", "s2", "slow op")
                .with_window(t0, 1200)
                .with_status(SpanStatus::Error),
        ])
        .unwrap();

    let (_, slow) = get(app.clone(), "/api/observability/traces?min_duration_ms=500").await;
    assert_eq!(slow["count"], 1);
    assert_eq!(slow["traces"][0]["trace_id_hex"], "slow");

    // Legacy alias behaves the same.
    let (_, aliased) = get(app.clone(), "/api/observability/traces?min_duration=500").await;
    assert_eq!(aliased["count"], 1);

    let (_, errored) = get(app, "/api/observability/traces?status_code=ERROR").await;
    assert_eq!(errored["count"], 1);
    assert_eq!(errored["traces"][0]["span_id_hex"], "s2");
}

#[tokio::test]
async fn test_query_traces_by_operation_name() {
    let (app, state) = test_app();

    state
        .span_store()
        .insert_spans(vec![
            SpanRecord::new("r1", "t1", "s1", "GET /api/users"),
            SpanRecord::new("r2", "t2", "s2", "SELECT orders"),
        ])
        .unwrap();

    let (_, response) = get(app, "/api/observability/traces?operation_name=select").await;

    assert_eq!(response["count"], 1);
    assert_eq!(response["traces"][0]["name"], "SELECT orders");
}

#[tokio::test]
async fn test_trace_detail_builds_tree_with_layout() {
    let (app, state) = test_app();
    let t0 = Utc::now() - Duration::minutes(5);

    state
        .span_store()
        .insert_spans(vec![
            SpanRecord::new("r1", "order-trace", "root", "POST /orders").with_window(t0, 100),
            SpanRecord::new("r2", "order-trace", "auth", "Authenticate")
                .with_parent("root")
                .with_window(t0 + Duration::milliseconds(10), 40)
                .with_status(SpanStatus::Error),
            SpanRecord::new("r3", "order-trace", "db", "INSERT INTO orders")
                .with_parent("auth")
                .with_window(t0 + Duration::milliseconds(20), 10),
        ])
        .unwrap();

    let (status, response) = get(app, "/api/observability/traces/order-trace").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["trace_id_hex"], "order-trace");
    assert_eq!(response["span_count"], 3);
    assert_eq!(response["error_count"], 1);
    assert_eq!(response["duration_ms"], 100.0);

    let spans = response["trace"].as_array().unwrap();
    assert_eq!(spans[0]["span_id_hex"], "root");
    assert_eq!(spans[0]["depth"], 0);
    assert_eq!(spans[1]["span_id_hex"], "auth");
    assert_eq!(spans[1]["depth"], 1);
    assert_eq!(spans[2]["span_id_hex"], "db");
    assert_eq!(spans[2]["depth"], 2);

    // Timeline fractions stay inside the unit interval.
    for span in spans {
        let left = span["left"].as_f64().unwrap();
        let width = span["width"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&left));
        assert!(width > 0.0 && width <= 1.0);
    }
}

#[tokio::test]
async fn test_trace_detail_with_dangling_parent() {
    let (app, state) = test_app();
    let t0 = Utc::now() - Duration::minutes(5);

    // The parent span was never ingested; the orphan still roots a tree.
    state
        .span_store()
        .insert_spans(vec![
            SpanRecord::new("r1", "partial", "orphan", "downstream work")
                .with_parent("never-ingested")
                .with_window(t0, 50),
        ])
        .unwrap();

    let (status, response) = get(app, "/api/observability/traces/partial").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["span_count"], 1);
    assert_eq!(response["trace"][0]["depth"], 0);
}

#[tokio::test]
async fn test_trace_not_found_returns_404() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/api/observability/traces/nonexistent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "not_found");
}

#[tokio::test]
async fn test_empty_span_store_returns_empty_results() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/api/observability/traces").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["count"], 0);
}
