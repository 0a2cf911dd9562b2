//! Privacy and Legal Document Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::application::dto::{LegalDocumentResponse, PrivacySettingsResponse, UpdatePrivacyRequest};
use crate::application::services::{
    PrivacyError, PrivacyService, PrivacyServiceImpl, UpdatePrivacyDto,
};
use crate::infrastructure::repositories::PgPrivacyRepository;
use crate::presentation::http::extractors::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

impl From<PrivacyError> for AppError {
    fn from(e: PrivacyError) -> Self {
        match e {
            PrivacyError::DocumentNotFound => AppError::NotFound("Document not found".into()),
            PrivacyError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

fn privacy_service(state: &AppState) -> PrivacyServiceImpl<PgPrivacyRepository> {
    PrivacyServiceImpl::new(Arc::new(PgPrivacyRepository::new(state.db.clone())))
}

/// GET /api/v1/privacy
pub async fn get_settings(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PrivacySettingsResponse>, AppError> {
    let settings = privacy_service(&state).get_settings(user.party).await?;

    Ok(Json(settings.into()))
}

/// PATCH /api/v1/privacy
pub async fn update_settings(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<UpdatePrivacyRequest>,
) -> Result<Json<PrivacySettingsResponse>, AppError> {
    let dto = UpdatePrivacyDto {
        show_email: request.show_email,
        show_phone: request.show_phone,
        marketing_emails: request.marketing_emails,
    };

    let settings = privacy_service(&state)
        .update_settings(user.party, dto)
        .await?;

    Ok(Json(settings.into()))
}

/// GET /api/v1/legal/{slug}
pub async fn get_document(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<LegalDocumentResponse>, AppError> {
    let document = privacy_service(&state).get_document(&slug).await?;

    Ok(Json(document.into()))
}
