//! Metrics Middleware
//!
//! Records request counts and latency for every HTTP request.

use axum::{extract::MatchedPath, extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::infrastructure::metrics;

/// Record Prometheus metrics for a request.
///
/// Uses the matched route pattern (e.g. `/api/v1/listings/{id}`) rather
/// than the raw path so label cardinality stays bounded.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed().as_secs_f64();

    metrics::record_http_request(&method, &path, response.status().as_u16(), duration);

    response
}
