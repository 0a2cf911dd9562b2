//! Listing Service
//!
//! Property listing CRUD and public search. Only agents own listings; write
//! operations check ownership.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    AccountRepository, Listing, ListingFilter, ListingRepository, ListingStatus, Party,
    PropertyType, Role,
};
use crate::shared::snowflake::SnowflakeGenerator;

/// Listing service trait
#[async_trait]
pub trait ListingService: Send + Sync {
    /// Create a listing owned by the acting agent
    async fn create_listing(
        &self,
        actor: Party,
        request: CreateListingDto,
    ) -> Result<Listing, ListingError>;

    /// Get one listing
    async fn get_listing(&self, id: i64) -> Result<Listing, ListingError>;

    /// Search active listings with filters
    async fn search_listings(&self, filter: ListingFilter) -> Result<Vec<Listing>, ListingError>;

    /// All listings owned by an agent (any status)
    async fn agent_listings(&self, agent_id: i64) -> Result<Vec<Listing>, ListingError>;

    /// Update a listing the actor owns
    async fn update_listing(
        &self,
        actor: Party,
        id: i64,
        request: UpdateListingDto,
    ) -> Result<Listing, ListingError>;

    /// Delete a listing the actor owns
    async fn delete_listing(&self, actor: Party, id: i64) -> Result<(), ListingError>;
}

/// Create listing input
#[derive(Debug, Clone)]
pub struct CreateListingDto {
    pub seller_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub price_cents: i64,
    pub address: String,
    pub city: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area_sqm: Option<i32>,
}

/// Update listing input; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateListingDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ListingStatus>,
    pub price_cents: Option<i64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_sqm: Option<i32>,
}

/// Listing service errors
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("Listing not found")]
    NotFound,

    #[error("Seller not found")]
    SellerNotFound,

    #[error("Only agents can manage listings")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// ListingService implementation
pub struct ListingServiceImpl<L, A>
where
    L: ListingRepository,
    A: AccountRepository,
{
    listing_repo: Arc<L>,
    account_repo: Arc<A>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<L, A> ListingServiceImpl<L, A>
where
    L: ListingRepository,
    A: AccountRepository,
{
    pub fn new(
        listing_repo: Arc<L>,
        account_repo: Arc<A>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            listing_repo,
            account_repo,
            id_generator,
        }
    }

    /// Fetch a listing the actor must own.
    async fn owned_listing(&self, actor: Party, id: i64) -> Result<Listing, ListingError> {
        if actor.role != Role::Agent {
            return Err(ListingError::Forbidden);
        }

        let listing = self
            .listing_repo
            .find_by_id(id)
            .await
            .map_err(|e| ListingError::Internal(e.to_string()))?
            .ok_or(ListingError::NotFound)?;

        if !listing.is_owned_by(actor.id) {
            return Err(ListingError::Forbidden);
        }

        Ok(listing)
    }
}

#[async_trait]
impl<L, A> ListingService for ListingServiceImpl<L, A>
where
    L: ListingRepository + 'static,
    A: AccountRepository + 'static,
{
    async fn create_listing(
        &self,
        actor: Party,
        request: CreateListingDto,
    ) -> Result<Listing, ListingError> {
        if actor.role != Role::Agent {
            return Err(ListingError::Forbidden);
        }

        if let Some(seller_id) = request.seller_id {
            let exists = self
                .account_repo
                .find_by_id(Role::Seller, seller_id)
                .await
                .map_err(|e| ListingError::Internal(e.to_string()))?
                .is_some();
            if !exists {
                return Err(ListingError::SellerNotFound);
            }
        }

        let now = Utc::now();
        let listing = Listing {
            id: self.id_generator.generate(),
            agent_id: actor.id,
            seller_id: request.seller_id,
            title: request.title,
            description: request.description,
            property_type: request.property_type,
            status: ListingStatus::Active,
            price_cents: request.price_cents,
            address: request.address,
            city: request.city,
            bedrooms: request.bedrooms,
            bathrooms: request.bathrooms,
            area_sqm: request.area_sqm,
            created_at: now,
            updated_at: now,
        };

        self.listing_repo
            .create(&listing)
            .await
            .map_err(|e| ListingError::Internal(e.to_string()))
    }

    async fn get_listing(&self, id: i64) -> Result<Listing, ListingError> {
        self.listing_repo
            .find_by_id(id)
            .await
            .map_err(|e| ListingError::Internal(e.to_string()))?
            .ok_or(ListingError::NotFound)
    }

    async fn search_listings(&self, filter: ListingFilter) -> Result<Vec<Listing>, ListingError> {
        self.listing_repo
            .search(&filter)
            .await
            .map_err(|e| ListingError::Internal(e.to_string()))
    }

    async fn agent_listings(&self, agent_id: i64) -> Result<Vec<Listing>, ListingError> {
        self.listing_repo
            .find_by_agent(agent_id)
            .await
            .map_err(|e| ListingError::Internal(e.to_string()))
    }

    async fn update_listing(
        &self,
        actor: Party,
        id: i64,
        request: UpdateListingDto,
    ) -> Result<Listing, ListingError> {
        let mut listing = self.owned_listing(actor, id).await?;

        if let Some(title) = request.title {
            listing.title = title;
        }
        if let Some(description) = request.description {
            listing.description = description;
        }
        if let Some(status) = request.status {
            listing.status = status;
        }
        if let Some(price_cents) = request.price_cents {
            listing.price_cents = price_cents;
        }
        if let Some(bedrooms) = request.bedrooms {
            listing.bedrooms = bedrooms;
        }
        if let Some(bathrooms) = request.bathrooms {
            listing.bathrooms = bathrooms;
        }
        if let Some(area_sqm) = request.area_sqm {
            listing.area_sqm = Some(area_sqm);
        }
        listing.updated_at = Utc::now();

        self.listing_repo
            .update(&listing)
            .await
            .map_err(|e| ListingError::Internal(e.to_string()))
    }

    async fn delete_listing(&self, actor: Party, id: i64) -> Result<(), ListingError> {
        self.owned_listing(actor, id).await?;

        self.listing_repo
            .delete(id)
            .await
            .map_err(|e| ListingError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_dto_defaults_to_no_changes() {
        let dto = UpdateListingDto::default();
        assert!(dto.title.is_none());
        assert!(dto.status.is_none());
        assert!(dto.price_cents.is_none());
    }
}
