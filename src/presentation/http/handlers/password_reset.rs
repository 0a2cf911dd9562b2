//! Password Reset Handlers
//!
//! OTP request, verification and password reset. Responses stay terse so the
//! endpoints leak nothing about which emails exist beyond the documented
//! not-found behavior.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::{RequestResetRequest, ResetPasswordRequest, VerifyResetRequest};
use crate::application::services::{
    PasswordResetError, PasswordResetService, PasswordResetServiceImpl,
};
use crate::infrastructure::repositories::{PgAccountRepository, PgSessionRepository};
use crate::presentation::http::handlers::parse_role;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

impl From<PasswordResetError> for AppError {
    fn from(e: PasswordResetError) -> Self {
        match e {
            PasswordResetError::AccountNotFound => AppError::NotFound("Account not found".into()),
            PasswordResetError::InvalidCode => {
                AppError::BadRequest("Invalid or expired code".into())
            }
            PasswordResetError::RateLimited => AppError::RateLimited,
            PasswordResetError::EmailFailed(msg) => AppError::Internal(msg),
            PasswordResetError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

type ResetSvc = PasswordResetServiceImpl<PgAccountRepository, PgSessionRepository>;

fn reset_service(state: &AppState) -> ResetSvc {
    PasswordResetServiceImpl::new(
        Arc::new(PgAccountRepository::new(state.db.clone())),
        Arc::new(PgSessionRepository::new(state.db.clone())),
        state.otp_store.clone(),
        state.mailer.clone(),
        state.settings.otp.clone(),
    )
}

/// POST /api/v1/auth/{role}/password/request
pub async fn request_code(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Json(request): Json<RequestResetRequest>,
) -> Result<StatusCode, AppError> {
    let role = parse_role(&role)?;
    request.validate().map_err(validation_error)?;

    reset_service(&state).request_code(role, &request.email).await?;

    Ok(StatusCode::ACCEPTED)
}

/// POST /api/v1/auth/{role}/password/verify
pub async fn verify_code(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Json(request): Json<VerifyResetRequest>,
) -> Result<StatusCode, AppError> {
    let role = parse_role(&role)?;
    request.validate().map_err(validation_error)?;

    reset_service(&state)
        .verify_code(role, &request.email, &request.code)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/{role}/password/reset
pub async fn reset_password(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<StatusCode, AppError> {
    let role = parse_role(&role)?;
    request.validate().map_err(validation_error)?;

    reset_service(&state)
        .reset_password(role, &request.email, &request.code, &request.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
