//! HTTP Middleware
//!
//! Authentication, rate limiting, CORS and security headers.

pub mod auth;
pub mod cors;
pub mod metrics;
pub mod rate_limit;
pub mod security;

pub use auth::auth_middleware;
pub use cors::create_cors_layer;
pub use metrics::track_metrics;
pub use rate_limit::{rate_limit_api, rate_limit_auth, rate_limit_websocket};
pub use security::{create_security_headers_layer, SecurityHeadersLayer};
