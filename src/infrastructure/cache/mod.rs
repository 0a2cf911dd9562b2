//! Cache Module
//!
//! Redis connection management and ephemeral state.
//!
//! Redis holds only short-lived state here: password-reset OTP codes and
//! their per-email rate-limit counters. Everything durable lives in
//! PostgreSQL.

mod otp_cache;

pub use otp_cache::OtpStore;

use redis::aio::ConnectionManager;
use redis::Client;
use tracing::{info, instrument};

use crate::config::RedisSettings;

/// Creates a Redis connection manager with automatic reconnection.
///
/// The connection manager handles connection pooling and automatic
/// reconnection when the connection is lost.
#[instrument(skip(settings), fields(url = %settings.url))]
pub async fn create_redis_client(
    settings: &RedisSettings,
) -> Result<ConnectionManager, redis::RedisError> {
    info!("Connecting to Redis...");
    let client = Client::open(settings.url.as_str())?;
    let manager = ConnectionManager::new(client).await?;
    info!("Redis connection established");
    Ok(manager)
}

/// Cache key prefixes.
///
/// Use these constants to ensure consistent key naming across the application.
pub mod keys {
    /// Prefix for password-reset OTP codes (e.g., "otp:buyer:user@x.com")
    pub const OTP: &str = "otp:";

    /// Prefix for OTP request rate counters (e.g., "otp_rate:buyer:user@x.com")
    pub const OTP_RATE: &str = "otp_rate:";

    /// Generates an OTP key for an email/role pair
    #[inline]
    pub fn otp(role: &str, email: &str) -> String {
        format!("{}{}:{}", OTP, role, email)
    }

    /// Generates an OTP rate-limit key for an email/role pair
    #[inline]
    pub fn otp_rate(role: &str, email: &str) -> String {
        format!("{}{}:{}", OTP_RATE, role, email)
    }
}
