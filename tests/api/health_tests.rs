//! Health and Metrics Endpoint Tests

use crate::common::{read_json, TestApp};

#[tokio::test]
async fn test_health_check_returns_ok() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let response = app.get("/health").await;
    assert_eq!(response.status(), 200);

    let json = read_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_liveness_probe() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    assert_eq!(app.get("/health/live").await.status(), 200);
}

#[tokio::test]
async fn test_readiness_probe_with_live_stack() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let response = app.get("/health/ready").await;
    assert_eq!(response.status(), 200);

    let json = read_json(response).await;
    assert_eq!(json["database"], "up");
    assert_eq!(json["redis"], "up");
}

#[tokio::test]
async fn test_metrics_exposed_after_traffic() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    app.get("/health").await;

    let response = app.get("/metrics").await;
    assert_eq!(response.status(), 200);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("http_requests_total"));
}

#[tokio::test]
async fn test_security_headers_present() {
    let Some(app) = TestApp::spawn().await else {
        return;
    };

    let response = app.get("/health").await;
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
}
