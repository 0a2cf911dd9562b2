//! Showing Handlers
//!
//! Buyers request showings; agents accept, decline or complete them; either
//! side can cancel an accepted one.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::application::dto::{CreateShowingRequest, DeclineShowingRequest, ShowingResponse};
use crate::application::services::{
    RequestShowingDto, ShowingError, ShowingService, ShowingServiceImpl,
};
use crate::infrastructure::repositories::{
    PgListingRepository, PgNotificationRepository, PgShowingRepository,
};
use crate::presentation::http::extractors::AuthUser;
use crate::presentation::http::handlers::parse_body_id;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

impl From<ShowingError> for AppError {
    fn from(e: ShowingError) -> Self {
        match e {
            ShowingError::NotFound => AppError::NotFound("Showing not found".into()),
            ShowingError::ListingNotFound => AppError::NotFound("Listing not found".into()),
            ShowingError::ListingClosed => {
                AppError::Conflict("Listing is not open for showings".into())
            }
            ShowingError::Forbidden => AppError::Forbidden("Permission denied".into()),
            ShowingError::InvalidWindow => AppError::BadRequest("Invalid time window".into()),
            ShowingError::InvalidTransition { from, to } => {
                AppError::Conflict(format!("Cannot move showing from {} to {}", from, to))
            }
            ShowingError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

type ShowingSvc =
    ShowingServiceImpl<PgShowingRepository, PgListingRepository, PgNotificationRepository>;

fn showing_service(state: &AppState) -> ShowingSvc {
    ShowingServiceImpl::new(
        Arc::new(PgShowingRepository::new(state.db.clone())),
        Arc::new(PgListingRepository::new(state.db.clone())),
        Arc::new(PgNotificationRepository::new(state.db.clone())),
        state.snowflake.clone(),
    )
}

/// POST /api/v1/showings
pub async fn request(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateShowingRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate().map_err(validation_error)?;

    let dto = RequestShowingDto {
        listing_id: parse_body_id(&request.listing_id)?,
        scheduled_start: request.scheduled_start,
        scheduled_end: request.scheduled_end,
        note: request.note,
    };

    let showing = showing_service(&state)
        .request_showing(user.party, dto)
        .await?;

    Ok((StatusCode::CREATED, Json(ShowingResponse::from(showing))))
}

/// GET /api/v1/showings
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ShowingResponse>>, AppError> {
    let showings = showing_service(&state).list_showings(user.party).await?;

    Ok(Json(showings.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/showings/{id}
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ShowingResponse>, AppError> {
    let showing = showing_service(&state).get_showing(user.party, id).await?;
    Ok(Json(showing.into()))
}

/// GET /api/v1/listings/{id}/showings
pub async fn for_listing(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ShowingResponse>>, AppError> {
    let showings = showing_service(&state)
        .listing_showings(user.party, id)
        .await?;

    Ok(Json(showings.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/showings/{id}/accept
pub async fn accept(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ShowingResponse>, AppError> {
    let showing = showing_service(&state).accept_showing(user.party, id).await?;
    Ok(Json(showing.into()))
}

/// POST /api/v1/showings/{id}/decline
pub async fn decline(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<DeclineShowingRequest>,
) -> Result<Json<ShowingResponse>, AppError> {
    request.validate().map_err(validation_error)?;

    let showing = showing_service(&state)
        .decline_showing(user.party, id, request.reason)
        .await?;

    Ok(Json(showing.into()))
}

/// POST /api/v1/showings/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ShowingResponse>, AppError> {
    let showing = showing_service(&state).cancel_showing(user.party, id).await?;
    Ok(Json(showing.into()))
}

/// POST /api/v1/showings/{id}/complete
pub async fn complete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ShowingResponse>, AppError> {
    let showing = showing_service(&state)
        .complete_showing(user.party, id)
        .await?;
    Ok(Json(showing.into()))
}
