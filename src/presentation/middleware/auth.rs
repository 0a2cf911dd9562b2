//! Authentication Middleware
//!
//! Validates the Bearer access token and attaches the resolved [`AuthUser`]
//! to the request extensions for downstream extractors.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::application::services::{decode_access_token, AuthError};
use crate::presentation::http::extractors::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authentication middleware for protected routes.
///
/// Expects `Authorization: Bearer <jwt>`. The token's claims carry the
/// account role, so the request resolves to a full `Party` without a
/// database round trip.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    let claims = decode_access_token(token, &state.settings.jwt.secret).map_err(|e| match e {
        AuthError::TokenExpired => AppError::Unauthorized("Token expired".into()),
        _ => AppError::Unauthorized("Invalid token".into()),
    })?;

    let party = claims
        .party()
        .map_err(|_| AppError::Unauthorized("Invalid token".into()))?;

    request.extensions_mut().insert(AuthUser { party });

    Ok(next.run(request).await)
}
