//! HTTP Request Handlers
//!
//! Handlers build their services from [`AppState`] per request, validate
//! input, and map service errors onto [`AppError`] responses.
//!
//! [`AppState`]: crate::startup::AppState
//! [`AppError`]: crate::shared::error::AppError

pub mod auth;
pub mod chat;
pub mod health;
pub mod listing;
pub mod notification;
pub mod password_reset;
pub mod privacy;
pub mod showing;

use crate::domain::Role;
use crate::shared::error::AppError;

/// Parse a snowflake ID rendered as a JSON string.
pub(crate) fn parse_body_id(value: &str) -> Result<i64, AppError> {
    value
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("Invalid id: {}", value)))
}

/// Parse a `{role}` path segment.
pub(crate) fn parse_role(value: &str) -> Result<Role, AppError> {
    Role::from_str(value).ok_or_else(|| AppError::BadRequest(format!("Unknown role: {}", value)))
}
