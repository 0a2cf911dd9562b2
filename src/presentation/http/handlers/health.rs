//! Health and Metrics Handlers

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::infrastructure::metrics;
use crate::startup::AppState;

/// Basic health check
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Liveness probe: the process is up
pub async fn liveness() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe: verifies Postgres and Redis connectivity
pub async fn readiness(State(state): State<AppState>) -> Response {
    let db_ok = sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .is_ok();

    let mut redis = state.redis.clone();
    let redis_ok = redis::cmd("PING")
        .query_async::<String>(&mut redis)
        .await
        .is_ok();

    let status = if db_ok && redis_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = Json(json!({
        "database": if db_ok { "up" } else { "down" },
        "redis": if redis_ok { "up" } else { "down" },
    }));

    (status, body).into_response()
}

/// Prometheus metrics endpoint
pub async fn metrics_handler() -> Response {
    let body = metrics::gather_metrics();
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}
