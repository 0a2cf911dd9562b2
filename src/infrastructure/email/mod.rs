//! Email Module
//!
//! Outgoing SMTP mail (password-reset OTP codes).

mod mailer;

pub use mailer::Mailer;
