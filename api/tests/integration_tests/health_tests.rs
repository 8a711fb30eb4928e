//! Integration tests for the health endpoint.

use axum::http::StatusCode;

use super::common::{get, test_app};

#[tokio::test]
async fn test_health_returns_ok() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["service"], "sightline-api");
}
