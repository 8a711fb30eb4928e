//! Integration tests for metric querying and histogram aggregation.
//!
//! Tests cover:
//! - Filtering by metric name, type, and service
//! - The aggregated histogram endpoint in both wire shapes
//! - Malformed histogram samples degrading gracefully

use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;
use shared::models::{HistogramSample, LegacyBucket, MetricRecord, MetricType};

use super::common::{get, test_app};

#[tokio::test]
async fn test_query_metrics_with_filters() {
    let (app, state) = test_app();
    let now = Utc::now();

    state
        .metric_store()
        .insert_batch(vec![
            MetricRecord::new("m1", "cpu_usage", MetricType::Gauge)
                .with_resource_attribute("service.name", "api")
                .with_sample(0.4, now),
            MetricRecord::new("m2", "http_requests_total", MetricType::Sum)
                .with_resource_attribute("service.name", "api")
                .with_sample(1234.0, now),
            MetricRecord::new("m3", "request_duration_ms", MetricType::Histogram)
                .with_resource_attribute("service.name", "worker"),
        ])
        .unwrap();

    let (status, all) = get(app.clone(), "/api/observability/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["count"], 3);

    let (_, by_name) = get(app.clone(), "/api/observability/metrics?metric_name=requests").await;
    assert_eq!(by_name["count"], 1);
    assert_eq!(by_name["metrics"][0]["name"], "http_requests_total");

    let (_, by_type) = get(app.clone(), "/api/observability/metrics?metric_type=histogram").await;
    assert_eq!(by_type["count"], 1);
    assert_eq!(by_type["metrics"][0]["type"], "histogram");

    let (_, by_service) = get(
        app,
        "/api/observability/metrics?resource_service_name=worker",
    )
    .await;
    assert_eq!(by_service["count"], 1);
    assert_eq!(by_service["metrics"][0]["id"], "m3");
}

#[tokio::test]
async fn test_histogram_endpoint_merges_modern_samples() {
    let (app, state) = test_app();
    let now = Utc::now();

    state
        .metric_store()
        .insert(
            MetricRecord::new("m1", "request_duration_ms", MetricType::Histogram)
                .with_histogram_sample(
                    HistogramSample::Modern {
                        bucket_counts: vec![1, 2, 3],
                        explicit_bounds: vec![10.0, 20.0],
                        sum: 12.5,
                        count: 6,
                    },
                    now,
                )
                .with_histogram_sample(
                    HistogramSample::Modern {
                        bucket_counts: vec![4, 5, 6],
                        explicit_bounds: vec![10.0, 20.0],
                        sum: 30.0,
                        count: 15,
                    },
                    now,
                ),
        )
        .unwrap();

    let (status, response) = get(
        app,
        "/api/observability/metrics/request_duration_ms/histogram",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["histogram"]["bucket_counts"], json!([5, 7, 9]));
    assert_eq!(response["histogram"]["explicit_bounds"], json!([10.0, 20.0]));
    assert_eq!(response["histogram"]["sum"], 42.5);
    assert_eq!(response["histogram"]["count"], 21);
}

#[tokio::test]
async fn test_histogram_endpoint_legacy_differencing() {
    let (app, state) = test_app();
    let now = Utc::now();

    state
        .metric_store()
        .insert(
            MetricRecord::new("m1", "db_latency", MetricType::Histogram).with_histogram_sample(
                HistogramSample::Legacy {
                    buckets: vec![
                        LegacyBucket {
                            le: "10".to_string(),
                            count: 5,
                        },
                        LegacyBucket {
                            le: "20".to_string(),
                            count: 8,
                        },
                        LegacyBucket {
                            le: "+Inf".to_string(),
                            count: 10,
                        },
                    ],
                },
                now,
            ),
        )
        .unwrap();

    let (status, response) = get(app, "/api/observability/metrics/db_latency/histogram").await;

    assert_eq!(status, StatusCode::OK);
    // Cumulative [5, 8, 10] differences into per-bucket [5, 3, 2].
    assert_eq!(response["histogram"]["bucket_counts"], json!([5, 3, 2]));
    assert_eq!(response["histogram"]["count"], 10);
}

#[tokio::test]
async fn test_histogram_endpoint_skips_malformed_samples() {
    let (app, state) = test_app();
    let now = Utc::now();

    state
        .metric_store()
        .insert(
            MetricRecord::new("m1", "latency", MetricType::Histogram)
                .with_histogram_sample(
                    HistogramSample::Modern {
                        bucket_counts: vec![2, 2],
                        explicit_bounds: vec![50.0],
                        sum: 80.0,
                        count: 4,
                    },
                    now,
                )
                // Shape violation: one count too few. Skipped, not fatal.
                .with_histogram_sample(
                    HistogramSample::Modern {
                        bucket_counts: vec![9],
                        explicit_bounds: vec![50.0],
                        sum: 9.0,
                        count: 9,
                    },
                    now,
                ),
        )
        .unwrap();

    let (status, response) = get(app, "/api/observability/metrics/latency/histogram").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["histogram"]["bucket_counts"], json!([2, 2]));
    assert_eq!(response["histogram"]["count"], 4);
}

#[tokio::test]
async fn test_histogram_endpoint_no_samples_is_null() {
    let (app, state) = test_app();

    state
        .metric_store()
        .insert(MetricRecord::new("m1", "cpu_usage", MetricType::Gauge))
        .unwrap();

    let (status, response) = get(app, "/api/observability/metrics/cpu_usage/histogram").await;

    assert_eq!(status, StatusCode::OK);
    assert!(response["histogram"].is_null());
}

#[tokio::test]
async fn test_empty_metric_store_returns_empty_results() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/api/observability/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["count"], 0);
}
