//! Rate Limiting Middleware
//!
//! Redis-backed sliding-window rate limiting. Each request records a
//! timestamp in a sorted set; entries older than the window are pruned
//! before counting. Authenticated requests are keyed by account, anonymous
//! requests by client IP.

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use redis::aio::ConnectionManager;

use crate::config::RateLimitSettings;
use crate::presentation::http::extractors::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Window length for every endpoint class
const WINDOW_SECS: u64 = 60;

/// Per-window limits for an endpoint class
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
}

/// Endpoint classes with distinct limits
#[derive(Debug, Clone, Copy)]
pub enum EndpointType {
    /// Login, registration, password reset
    Auth,
    /// General API endpoints
    Api,
    /// WebSocket upgrade requests
    WebSocket,
}

impl EndpointType {
    pub fn config(&self, limits: &RateLimitSettings) -> RateLimitConfig {
        let max_requests = match self {
            EndpointType::Auth => limits.auth_per_minute,
            EndpointType::Api => limits.api_per_minute,
            EndpointType::WebSocket => limits.websocket_per_minute,
        };
        RateLimitConfig {
            max_requests,
            window_secs: WINDOW_SECS,
        }
    }

    fn key_prefix(&self) -> &'static str {
        match self {
            EndpointType::Auth => "rl:auth",
            EndpointType::Api => "rl:api",
            EndpointType::WebSocket => "rl:ws",
        }
    }
}

/// Sliding-window check. KEYS[1] = counter key, ARGV = [window_start_ms,
/// now_ms, max_requests, window_secs]. Returns [allowed, current_count].
const SLIDING_WINDOW_SCRIPT: &str = r#"
local key = KEYS[1]
local window_start = tonumber(ARGV[1])
local now = tonumber(ARGV[2])
local max_requests = tonumber(ARGV[3])
local window_secs = tonumber(ARGV[4])

redis.call('ZREMRANGEBYSCORE', key, '-inf', window_start)
local count = redis.call('ZCARD', key)

if count < max_requests then
    redis.call('ZADD', key, now, now .. '-' .. math.random(1000000))
    redis.call('EXPIRE', key, window_secs)
    return {1, count + 1}
end

return {0, count}
"#;

/// Identify the caller: account for authenticated requests, client IP
/// otherwise.
fn extract_identifier(request: &Request) -> String {
    if let Some(user) = request.extensions().get::<AuthUser>() {
        return format!("{}:{}", user.party.role.as_str(), user.party.id);
    }

    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(ip) = forwarded.split(',').next() {
            return format!("ip:{}", ip.trim());
        }
    }

    if let Some(real_ip) = request
        .headers()
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
    {
        return format!("ip:{}", real_ip);
    }

    "ip:unknown".to_string()
}

async fn check_rate_limit(
    redis: &mut ConnectionManager,
    endpoint: EndpointType,
    config: RateLimitConfig,
    identifier: &str,
) -> Result<(bool, u32), redis::RedisError> {
    let key = format!("{}:{}", endpoint.key_prefix(), identifier);

    let now_ms = chrono::Utc::now().timestamp_millis();
    let window_start_ms = now_ms - (config.window_secs as i64) * 1000;

    let (allowed, count): (i64, i64) = redis::Script::new(SLIDING_WINDOW_SCRIPT)
        .key(&key)
        .arg(window_start_ms)
        .arg(now_ms)
        .arg(config.max_requests)
        .arg(config.window_secs)
        .invoke_async(redis)
        .await?;

    Ok((allowed == 1, count as u32))
}

async fn rate_limit(
    state: AppState,
    endpoint: EndpointType,
    request: Request,
    next: Next,
) -> Response {
    let identifier = extract_identifier(&request);
    let config = endpoint.config(&state.settings.rate_limit);
    let mut redis = state.redis.clone();

    match check_rate_limit(&mut redis, endpoint, config, &identifier).await {
        Ok((true, count)) => {
            let mut response = next.run(request).await;
            set_rate_limit_headers(&mut response, config, count);
            response
        }
        Ok((false, count)) => {
            tracing::warn!(
                identifier = %identifier,
                endpoint = ?endpoint,
                "Rate limit exceeded"
            );
            let mut response = AppError::RateLimited.into_response();
            set_rate_limit_headers(&mut response, config, count);
            response
        }
        Err(e) => {
            // Fail open: a Redis outage must not take the API down with it
            tracing::error!(error = %e, "Rate limiter unavailable, allowing request");
            next.run(request).await
        }
    }
}

fn set_rate_limit_headers(response: &mut Response, config: RateLimitConfig, count: u32) {
    let remaining = config.max_requests.saturating_sub(count);
    let headers = response.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&config.max_requests.to_string()) {
        headers.insert("x-ratelimit-limit", v);
    }
    if let Ok(v) = HeaderValue::from_str(&remaining.to_string()) {
        headers.insert("x-ratelimit-remaining", v);
    }
    if let Ok(v) = HeaderValue::from_str(&config.window_secs.to_string()) {
        headers.insert("x-ratelimit-reset", v);
    }
}

/// Strict limiter for authentication endpoints
pub async fn rate_limit_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    rate_limit(state, EndpointType::Auth, request, next).await
}

/// Standard limiter for API endpoints
pub async fn rate_limit_api(State(state): State<AppState>, request: Request, next: Next) -> Response {
    rate_limit(state, EndpointType::Api, request, next).await
}

/// Limiter for WebSocket upgrade requests
pub async fn rate_limit_websocket(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    rate_limit(state, EndpointType::WebSocket, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_endpoint_limits_come_from_settings() {
        let limits = RateLimitSettings {
            auth_per_minute: 3,
            api_per_minute: 120,
            websocket_per_minute: 7,
        };

        assert_eq!(EndpointType::Auth.config(&limits).max_requests, 3);
        assert_eq!(EndpointType::Api.config(&limits).max_requests, 120);
        assert_eq!(EndpointType::WebSocket.config(&limits).max_requests, 7);
        assert_eq!(EndpointType::Api.config(&limits).window_secs, WINDOW_SECS);
    }

    #[test]
    fn test_identifier_prefers_forwarded_header() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_identifier(&request), "ip:203.0.113.7");
    }

    #[test]
    fn test_identifier_prefers_authenticated_account() {
        use crate::domain::{Party, Role};

        let mut request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::empty())
            .unwrap();
        request.extensions_mut().insert(AuthUser {
            party: Party::new(Role::Agent, 42),
        });
        assert_eq!(extract_identifier(&request), "agent:42");
    }

    #[test]
    fn test_identifier_fallback() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_identifier(&request), "ip:unknown");
    }
}
