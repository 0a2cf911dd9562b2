//! Security Headers Middleware
//!
//! Adds standard security headers to every response.

use axum::http::{HeaderValue, Request, Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower layer that applies security headers to responses
#[derive(Debug, Clone)]
pub struct SecurityHeadersLayer {
    hsts_enabled: bool,
}

impl SecurityHeadersLayer {
    pub fn new() -> Self {
        Self { hsts_enabled: true }
    }

    /// Disable HSTS (for local development over plain HTTP)
    pub fn without_hsts() -> Self {
        Self {
            hsts_enabled: false,
        }
    }
}

impl Default for SecurityHeadersLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeadersService {
            inner,
            hsts_enabled: self.hsts_enabled,
        }
    }
}

/// Service wrapper that injects the headers
#[derive(Debug, Clone)]
pub struct SecurityHeadersService<S> {
    inner: S,
    hsts_enabled: bool,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for SecurityHeadersService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let hsts_enabled = self.hsts_enabled;
        let future = self.inner.call(request);

        Box::pin(async move {
            let mut response = future.await?;
            let headers = response.headers_mut();

            headers.insert(
                "x-content-type-options",
                HeaderValue::from_static("nosniff"),
            );
            headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
            headers.insert("x-xss-protection", HeaderValue::from_static("1; mode=block"));
            headers.insert(
                "referrer-policy",
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            );
            headers.insert(
                "content-security-policy",
                HeaderValue::from_static(
                    "default-src 'self'; frame-ancestors 'none'; base-uri 'self'",
                ),
            );
            headers.insert(
                "permissions-policy",
                HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
            );

            if hsts_enabled {
                headers.insert(
                    "strict-transport-security",
                    HeaderValue::from_static("max-age=31536000; includeSubDomains"),
                );
            }

            Ok(response)
        })
    }
}

/// Create the security headers layer for production (HSTS enabled)
pub fn create_security_headers_layer() -> SecurityHeadersLayer {
    SecurityHeadersLayer::new()
}

/// Create the security headers layer without HSTS
pub fn create_security_headers_layer_no_hsts() -> SecurityHeadersLayer {
    SecurityHeadersLayer::without_hsts()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use tower::ServiceExt;

    async fn handler() -> &'static str {
        "ok"
    }

    #[tokio::test]
    async fn test_security_headers_applied() {
        let app = Router::new()
            .route("/", get(handler))
            .layer(SecurityHeadersLayer::new());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert!(headers.contains_key("strict-transport-security"));
        assert!(headers.contains_key("content-security-policy"));
    }

    #[tokio::test]
    async fn test_hsts_disabled() {
        let app = Router::new()
            .route("/", get(handler))
            .layer(SecurityHeadersLayer::without_hsts());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(!response.headers().contains_key("strict-transport-security"));
        assert_eq!(
            response.headers().get("x-frame-options").unwrap(),
            "DENY"
        );
    }
}
