//! OTP Store
//!
//! Redis-backed storage for password-reset OTP codes.
//!
//! Codes are written with a TTL and consumed with GETDEL so a code can be
//! redeemed at most once. A per-email counter with a one-hour expiry caps
//! how often codes can be requested.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::keys;
use crate::domain::value_objects::Role;
use crate::shared::error::AppError;

/// Seconds in the OTP request rate-limit window.
const RATE_WINDOW_SECS: u64 = 3600;

/// Redis-backed OTP storage.
#[derive(Clone)]
pub struct OtpStore {
    conn: ConnectionManager,
}

impl OtpStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Store a code for the email/role pair, replacing any previous code.
    pub async fn store(
        &self,
        role: Role,
        email: &str,
        code: &str,
        ttl_secs: u64,
    ) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let key = keys::otp(role.as_str(), email);
        conn.set_ex::<_, _, ()>(key, code, ttl_secs).await?;
        Ok(())
    }

    /// Read the stored code without consuming it (for pre-reset verification).
    pub async fn peek(&self, role: Role, email: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.conn.clone();
        let key = keys::otp(role.as_str(), email);
        let code: Option<String> = conn.get(key).await?;
        Ok(code)
    }

    /// Atomically read and delete the stored code.
    ///
    /// Returns `None` when no code is stored (expired or already consumed).
    pub async fn consume(&self, role: Role, email: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.conn.clone();
        let key = keys::otp(role.as_str(), email);
        let code: Option<String> = redis::cmd("GETDEL").arg(key).query_async(&mut conn).await?;
        Ok(code)
    }

    /// Count a request against the hourly window; returns the new total.
    ///
    /// The expiry is only set when the key is created so the window does not
    /// slide on every request.
    pub async fn bump_request_count(&self, role: Role, email: &str) -> Result<u32, AppError> {
        let mut conn = self.conn.clone();
        let key = keys::otp_rate(role.as_str(), email);
        let count: u32 = conn.incr(&key, 1).await?;
        if count == 1 {
            conn.expire::<_, ()>(&key, RATE_WINDOW_SECS as i64).await?;
        }
        Ok(count)
    }
}
