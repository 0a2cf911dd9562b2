//! Listing Handlers
//!
//! Public search/detail endpoints plus agent-only write operations.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::application::dto::{
    CreateListingRequest, ListingQueryParams, ListingResponse, UpdateListingRequest,
};
use crate::application::services::{
    CreateListingDto, ListingError, ListingService, ListingServiceImpl, UpdateListingDto,
};
use crate::domain::{ListingFilter, ListingStatus, PropertyType};
use crate::infrastructure::repositories::{PgAccountRepository, PgListingRepository};
use crate::presentation::http::extractors::AuthUser;
use crate::presentation::http::handlers::parse_body_id;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Default and maximum page sizes for public search
const DEFAULT_SEARCH_LIMIT: i32 = 20;
const MAX_SEARCH_LIMIT: i32 = 100;

impl From<ListingError> for AppError {
    fn from(e: ListingError) -> Self {
        match e {
            ListingError::NotFound => AppError::NotFound("Listing not found".into()),
            ListingError::SellerNotFound => AppError::BadRequest("Seller not found".into()),
            ListingError::Forbidden => {
                AppError::Forbidden("Only the owning agent can manage this listing".into())
            }
            ListingError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

type ListingSvc = ListingServiceImpl<PgListingRepository, PgAccountRepository>;

fn listing_service(state: &AppState) -> ListingSvc {
    ListingServiceImpl::new(
        Arc::new(PgListingRepository::new(state.db.clone())),
        Arc::new(PgAccountRepository::new(state.db.clone())),
        state.snowflake.clone(),
    )
}

/// GET /api/v1/listings
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<ListingQueryParams>,
) -> Result<Json<Vec<ListingResponse>>, AppError> {
    let before = params.before.as_deref().map(parse_body_id).transpose()?;

    let filter = ListingFilter {
        city: params.city,
        property_type: params.property_type.as_deref().map(PropertyType::from_str),
        min_price_cents: params.min_price_cents,
        max_price_cents: params.max_price_cents,
        min_bedrooms: params.min_bedrooms,
        before,
        limit: params
            .limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT),
    };

    let listings = listing_service(&state).search_listings(filter).await?;

    Ok(Json(listings.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/listings/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ListingResponse>, AppError> {
    let listing = listing_service(&state).get_listing(id).await?;
    Ok(Json(listing.into()))
}

/// GET /api/v1/listings/my
pub async fn my_listings(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ListingResponse>>, AppError> {
    if !user.party.is_agent() {
        return Err(AppError::Forbidden("Only agents own listings".into()));
    }

    let listings = listing_service(&state).agent_listings(user.party.id).await?;

    Ok(Json(listings.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/listings
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateListingRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate().map_err(validation_error)?;

    let seller_id = request.seller_id.as_deref().map(parse_body_id).transpose()?;

    let dto = CreateListingDto {
        seller_id,
        title: request.title,
        description: request.description,
        property_type: PropertyType::from_str(&request.property_type),
        price_cents: request.price_cents,
        address: request.address,
        city: request.city,
        bedrooms: request.bedrooms,
        bathrooms: request.bathrooms,
        area_sqm: request.area_sqm,
    };

    let listing = listing_service(&state).create_listing(user.party, dto).await?;

    Ok((StatusCode::CREATED, Json(ListingResponse::from(listing))))
}

/// PATCH /api/v1/listings/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateListingRequest>,
) -> Result<Json<ListingResponse>, AppError> {
    request.validate().map_err(validation_error)?;

    let dto = UpdateListingDto {
        title: request.title,
        description: request.description,
        status: request.status.as_deref().map(ListingStatus::from_str),
        price_cents: request.price_cents,
        bedrooms: request.bedrooms,
        bathrooms: request.bathrooms,
        area_sqm: request.area_sqm,
    };

    let listing = listing_service(&state)
        .update_listing(user.party, id, dto)
        .await?;

    Ok(Json(listing.into()))
}

/// DELETE /api/v1/listings/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    listing_service(&state).delete_listing(user.party, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
