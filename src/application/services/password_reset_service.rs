//! Password Reset Service
//!
//! OTP-based password reset. A 6-digit code is stored in Redis with a TTL,
//! sent over SMTP, and consumed exactly once on a successful reset. Requests
//! are rate limited per email per hour.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use async_trait::async_trait;
use rand::Rng;

use crate::config::OtpSettings;
use crate::domain::{AccountRepository, Party, Role, SessionRepository};
use crate::infrastructure::cache::OtpStore;
use crate::infrastructure::email::Mailer;
use crate::infrastructure::metrics;
use crate::shared::validation::mask_email;

/// Password reset service trait
#[async_trait]
pub trait PasswordResetService: Send + Sync {
    /// Generate a code for the account and send it over email.
    async fn request_code(&self, role: Role, email: &str) -> Result<(), PasswordResetError>;

    /// Check a code without consuming it (pre-reset form validation).
    async fn verify_code(&self, role: Role, email: &str, code: &str)
        -> Result<(), PasswordResetError>;

    /// Consume the code and set a new password. All of the account's
    /// sessions are invalidated.
    async fn reset_password(
        &self,
        role: Role,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), PasswordResetError>;
}

/// Password reset errors
#[derive(Debug, thiserror::Error)]
pub enum PasswordResetError {
    #[error("Account not found")]
    AccountNotFound,

    #[error("Invalid or expired code")]
    InvalidCode,

    #[error("Too many reset requests")]
    RateLimited,

    #[error("Email delivery failed: {0}")]
    EmailFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Generate a zero-padded 6-digit code.
fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{:06}", n)
}

/// PasswordResetService implementation
pub struct PasswordResetServiceImpl<A, S>
where
    A: AccountRepository,
    S: SessionRepository,
{
    account_repo: Arc<A>,
    session_repo: Arc<S>,
    otp_store: OtpStore,
    mailer: Mailer,
    settings: OtpSettings,
}

impl<A, S> PasswordResetServiceImpl<A, S>
where
    A: AccountRepository,
    S: SessionRepository,
{
    pub fn new(
        account_repo: Arc<A>,
        session_repo: Arc<S>,
        otp_store: OtpStore,
        mailer: Mailer,
        settings: OtpSettings,
    ) -> Self {
        Self {
            account_repo,
            session_repo,
            otp_store,
            mailer,
            settings,
        }
    }

    fn hash_password(password: &str) -> Result<String, PasswordResetError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordResetError::Internal(format!("Password hashing failed: {}", e)))
    }
}

#[async_trait]
impl<A, S> PasswordResetService for PasswordResetServiceImpl<A, S>
where
    A: AccountRepository + 'static,
    S: SessionRepository + 'static,
{
    async fn request_code(&self, role: Role, email: &str) -> Result<(), PasswordResetError> {
        let account = self
            .account_repo
            .find_by_email(role, email)
            .await
            .map_err(|e| PasswordResetError::Internal(e.to_string()))?
            .ok_or(PasswordResetError::AccountNotFound)?;

        let requests = self
            .otp_store
            .bump_request_count(role, email)
            .await
            .map_err(|e| PasswordResetError::Internal(e.to_string()))?;

        if requests > self.settings.max_requests_per_hour {
            tracing::warn!(
                email = %mask_email(email),
                role = %role,
                "OTP request rate limit exceeded"
            );
            return Err(PasswordResetError::RateLimited);
        }

        let code = generate_code();
        self.otp_store
            .store(role, email, &code, self.settings.expiry_secs)
            .await
            .map_err(|e| PasswordResetError::Internal(e.to_string()))?;

        // A failed send is an error to the caller: the code is stored but
        // never arrived, so pretending success would strand the user
        match self
            .mailer
            .send_password_reset_code(&account.email, &code, self.settings.expiry_secs / 60)
            .await
        {
            Ok(()) => {
                metrics::record_otp_email("sent");
                tracing::info!(email = %mask_email(email), role = %role, "OTP code sent");
                Ok(())
            }
            Err(e) => {
                metrics::record_otp_email("failed");
                Err(PasswordResetError::EmailFailed(e.to_string()))
            }
        }
    }

    async fn verify_code(
        &self,
        role: Role,
        email: &str,
        code: &str,
    ) -> Result<(), PasswordResetError> {
        let stored = self
            .otp_store
            .peek(role, email)
            .await
            .map_err(|e| PasswordResetError::Internal(e.to_string()))?;

        match stored {
            Some(stored) if stored == code => Ok(()),
            _ => Err(PasswordResetError::InvalidCode),
        }
    }

    async fn reset_password(
        &self,
        role: Role,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), PasswordResetError> {
        let account = self
            .account_repo
            .find_by_email(role, email)
            .await
            .map_err(|e| PasswordResetError::Internal(e.to_string()))?
            .ok_or(PasswordResetError::AccountNotFound)?;

        // GETDEL: the code is gone after this read whether or not it matches,
        // so a guessed-wrong code also burns the stored one
        let stored = self
            .otp_store
            .consume(role, email)
            .await
            .map_err(|e| PasswordResetError::Internal(e.to_string()))?;

        match stored {
            Some(stored) if stored == code => {}
            _ => return Err(PasswordResetError::InvalidCode),
        }

        let password_hash = Self::hash_password(new_password)?;
        self.account_repo
            .update_password(role, account.id, &password_hash)
            .await
            .map_err(|e| PasswordResetError::Internal(e.to_string()))?;

        // Force re-login everywhere
        self.session_repo
            .delete_for_account(Party::new(role, account.id))
            .await
            .map_err(|e| PasswordResetError::Internal(e.to_string()))?;

        tracing::info!(email = %mask_email(email), role = %role, "Password reset completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
