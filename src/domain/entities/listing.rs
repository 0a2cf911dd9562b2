//! Listing entity and repository trait.
//!
//! Maps to the `listings` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Listing status matching the VARCHAR constraint on `listings.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    /// Visible in search, open for showings
    #[default]
    Active,
    /// Offer accepted, sale in progress
    Pending,
    /// Sale closed
    Sold,
    /// Taken off the market by the agent
    Withdrawn,
}

impl ListingStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pending" => Self::Pending,
            "sold" => Self::Sold,
            "withdrawn" => Self::Withdrawn,
            _ => Self::Active,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Sold => "sold",
            Self::Withdrawn => "withdrawn",
        }
    }

    /// Whether showings can still be requested.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Active | Self::Pending)
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Property type matching the VARCHAR constraint on `listings.property_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[default]
    House,
    Apartment,
    Condo,
    Townhouse,
    Land,
}

impl PropertyType {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "apartment" => Self::Apartment,
            "condo" => Self::Condo,
            "townhouse" => Self::Townhouse,
            "land" => Self::Land,
            _ => Self::House,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Apartment => "apartment",
            Self::Condo => "condo",
            Self::Townhouse => "townhouse",
            Self::Land => "land",
        }
    }
}

/// Represents a property listing.
///
/// Maps to the `listings` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - agent_id: BIGINT NOT NULL REFERENCES agents(id)
/// - seller_id: BIGINT NULL REFERENCES sellers(id)
/// - title: VARCHAR(200) NOT NULL
/// - description: TEXT NOT NULL
/// - property_type: VARCHAR(20) NOT NULL
/// - status: VARCHAR(20) NOT NULL DEFAULT 'active'
/// - price_cents: BIGINT NOT NULL
/// - address: VARCHAR(255) NOT NULL
/// - city: VARCHAR(100) NOT NULL
/// - bedrooms: INT NOT NULL
/// - bathrooms: INT NOT NULL
/// - area_sqm: INT NULL
/// - created_at / updated_at: TIMESTAMPTZ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Owning agent
    pub agent_id: i64,

    /// Seller the listing is on behalf of, when known
    pub seller_id: Option<i64>,

    /// Short headline
    pub title: String,

    /// Full description text
    pub description: String,

    /// Kind of property
    pub property_type: PropertyType,

    /// Market status
    pub status: ListingStatus,

    /// Asking price in cents (avoids float money)
    pub price_cents: i64,

    /// Street address
    pub address: String,

    /// City, used as a search filter
    pub city: String,

    /// Bedroom count
    pub bedrooms: i32,

    /// Bathroom count
    pub bathrooms: i32,

    /// Interior area in square meters
    pub area_sqm: Option<i32>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Whether the given agent owns this listing.
    pub fn is_owned_by(&self, agent_id: i64) -> bool {
        self.agent_id == agent_id
    }
}

/// Search filter for browsing listings.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub city: Option<String>,
    pub property_type: Option<PropertyType>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    pub min_bedrooms: Option<i32>,
    /// Keyset cursor: return listings with id < before
    pub before: Option<i64>,
    pub limit: i32,
}

/// Repository trait for Listing data access operations.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Find a listing by its Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Listing>, AppError>;

    /// Search active listings with filters and keyset pagination.
    async fn search(&self, filter: &ListingFilter) -> Result<Vec<Listing>, AppError>;

    /// Find all listings owned by an agent (any status).
    async fn find_by_agent(&self, agent_id: i64) -> Result<Vec<Listing>, AppError>;

    /// Create a new listing.
    async fn create(&self, listing: &Listing) -> Result<Listing, AppError>;

    /// Update a listing (title, description, price, status, counts).
    async fn update(&self, listing: &Listing) -> Result<Listing, AppError>;

    /// Delete a listing.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_status_roundtrip() {
        for status in [
            ListingStatus::Active,
            ListingStatus::Pending,
            ListingStatus::Sold,
            ListingStatus::Withdrawn,
        ] {
            assert_eq!(ListingStatus::from_str(status.as_str()), status);
        }
    }

    #[test]
    fn test_listing_status_unknown_defaults_to_active() {
        assert_eq!(ListingStatus::from_str("???"), ListingStatus::Active);
    }

    #[test]
    fn test_status_is_open() {
        assert!(ListingStatus::Active.is_open());
        assert!(ListingStatus::Pending.is_open());
        assert!(!ListingStatus::Sold.is_open());
        assert!(!ListingStatus::Withdrawn.is_open());
    }

    #[test]
    fn test_property_type_roundtrip() {
        for pt in [
            PropertyType::House,
            PropertyType::Apartment,
            PropertyType::Condo,
            PropertyType::Townhouse,
            PropertyType::Land,
        ] {
            assert_eq!(PropertyType::from_str(pt.as_str()), pt);
        }
    }
}
