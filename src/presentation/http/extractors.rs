//! Request Extractors
//!
//! Custom Axum extractors for handler arguments.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::domain::Party;
use crate::shared::error::AppError;

/// Authenticated account, resolved by the auth middleware.
///
/// Handlers take this as an argument on protected routes. The middleware
/// inserts it after validating the Bearer token, so a missing extension
/// means the route was wired without `auth_middleware`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub party: Party,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))
    }
}
