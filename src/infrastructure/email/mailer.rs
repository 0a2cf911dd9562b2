//! SMTP Mailer
//!
//! Async SMTP delivery for password-reset OTP codes. A send failure is
//! surfaced to the caller as an internal error; the OTP flow reports it as
//! HTTP 500 rather than pretending the code went out.

use std::sync::Arc;

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpSettings;
use crate::shared::error::AppError;

/// Async SMTP transport wrapper.
#[derive(Clone)]
pub struct Mailer {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl Mailer {
    /// Build the mailer from configuration.
    pub fn new(settings: &SmtpSettings) -> Result<Self, AppError> {
        let from = settings
            .from_address
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid SMTP from address: {}", e)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| AppError::Internal(format!("Failed to configure SMTP transport: {}", e)))?
            .port(settings.port);

        if !settings.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ));
        }

        Ok(Self {
            transport: Arc::new(builder.build()),
            from,
        })
    }

    /// Send a password-reset OTP code.
    pub async fn send_password_reset_code(
        &self,
        recipient: &str,
        code: &str,
        expiry_minutes: u64,
    ) -> Result<(), AppError> {
        let to = recipient
            .parse::<Mailbox>()
            .map_err(|e| AppError::BadRequest(format!("Invalid recipient address: {}", e)))?;

        let body = format!(
            "Your password reset code is: {}\n\n\
             The code expires in {} minutes and can be used once.\n\
             If you did not request a password reset, you can ignore this email.",
            code, expiry_minutes
        );

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Your password reset code")
            .body(body)
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| AppError::Internal(format!("Email send failed: {}", e)))?;

        Ok(())
    }
}
