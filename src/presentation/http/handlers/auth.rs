//! Authentication Handlers
//!
//! Registration, login, token refresh and logout for the three account
//! roles. The role is part of the path, so `/auth/buyer/login` and
//! `/auth/agent/login` authenticate against different tables.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::application::dto::{
    AccountResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, RegisterResponse,
    TokenResponse,
};
use crate::application::services::{
    AuthError, AuthService, AuthServiceImpl, RegisterAccountDto,
};
use crate::domain::AccountRepository;
use crate::infrastructure::repositories::{PgAccountRepository, PgSessionRepository};
use crate::presentation::http::extractors::AuthUser;
use crate::presentation::http::handlers::parse_role;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::TokenExpired => AppError::Unauthorized("Token expired".into()),
            AuthError::InvalidToken => AppError::Unauthorized("Invalid token".into()),
            AuthError::SessionNotFound => {
                AppError::Unauthorized("Session not found or expired".into())
            }
            AuthError::AccountNotFound => AppError::NotFound("Account not found".into()),
            AuthError::EmailExists => AppError::Conflict("Email already registered".into()),
            AuthError::LicenseRequired => {
                AppError::BadRequest("License number is required for agents".into())
            }
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

type AuthSvc = AuthServiceImpl<PgAccountRepository, PgSessionRepository>;

fn auth_service(state: &AppState) -> AuthSvc {
    AuthServiceImpl::new(
        Arc::new(PgAccountRepository::new(state.db.clone())),
        Arc::new(PgSessionRepository::new(state.db.clone())),
        state.snowflake.clone(),
        state.settings.jwt.clone(),
    )
}

/// POST /api/v1/auth/{role}/register
pub async fn register(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = parse_role(&role)?;
    request.validate().map_err(validation_error)?;

    let dto = RegisterAccountDto {
        full_name: request.full_name,
        email: request.email,
        password: request.password,
        phone: request.phone,
        license_number: request.license_number,
        agency: request.agency,
    };

    let (account, tokens) = auth_service(&state).register(role, dto).await?;

    tracing::info!(role = %role, account_id = account.id, "Account registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse::new(account, tokens)),
    ))
}

/// POST /api/v1/auth/{role}/login
pub async fn login(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let role = parse_role(&role)?;
    request.validate().map_err(validation_error)?;

    let tokens = auth_service(&state)
        .authenticate(role, &request.email, &request.password)
        .await?;

    Ok(Json(TokenResponse::from(tokens)))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let tokens = auth_service(&state)
        .refresh_token(&request.refresh_token)
        .await?;

    Ok(Json(TokenResponse::from(tokens)))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<StatusCode, AppError> {
    auth_service(&state)
        .revoke_token(&request.refresh_token)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<AccountResponse>, AppError> {
    let repo = PgAccountRepository::new(state.db.clone());
    let account = repo
        .find_by_id(user.party.role, user.party.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".into()))?;

    Ok(Json(AccountResponse::from_account(account, true)))
}
