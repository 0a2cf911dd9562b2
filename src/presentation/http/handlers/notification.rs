//! Notification Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::{NotificationQueryParams, NotificationResponse, UnreadCountResponse};
use crate::application::services::{
    NotificationError, NotificationService, NotificationServiceImpl,
};
use crate::infrastructure::repositories::PgNotificationRepository;
use crate::presentation::http::extractors::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

impl From<NotificationError> for AppError {
    fn from(e: NotificationError) -> Self {
        match e {
            NotificationError::NotFound => AppError::NotFound("Notification not found".into()),
            NotificationError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

fn notification_service(state: &AppState) -> NotificationServiceImpl<PgNotificationRepository> {
    NotificationServiceImpl::new(Arc::new(PgNotificationRepository::new(state.db.clone())))
}

/// GET /api/v1/notifications
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<NotificationQueryParams>,
) -> Result<Json<Vec<NotificationResponse>>, AppError> {
    let notifications = notification_service(&state)
        .list(user.party, params.limit)
        .await?;

    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/notifications/unread
pub async fn unread_count(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let unread = notification_service(&state).unread_count(user.party).await?;

    Ok(Json(UnreadCountResponse { unread }))
}

/// POST /api/v1/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    notification_service(&state).mark_read(user.party, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/read_all
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, AppError> {
    notification_service(&state).mark_all_read(user.party).await?;

    Ok(StatusCode::NO_CONTENT)
}
