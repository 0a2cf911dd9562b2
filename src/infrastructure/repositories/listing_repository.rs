//! Listing Repository Implementation
//!
//! PostgreSQL implementation of listing operations with filtered search and
//! keyset pagination.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};

use crate::domain::{Listing, ListingFilter, ListingRepository, ListingStatus, PropertyType};
use crate::shared::error::AppError;

/// PostgreSQL listing repository implementation.
pub struct PgListingRepository {
    pool: PgPool,
}

impl PgListingRepository {
    /// Creates a new PgListingRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for listing queries.
#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    id: i64,
    agent_id: i64,
    seller_id: Option<i64>,
    title: String,
    description: String,
    property_type: String,
    status: String,
    price_cents: i64,
    address: String,
    city: String,
    bedrooms: i32,
    bathrooms: i32,
    area_sqm: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ListingRow {
    /// Converts database row to domain Listing entity.
    fn into_listing(self) -> Listing {
        Listing {
            id: self.id,
            agent_id: self.agent_id,
            seller_id: self.seller_id,
            title: self.title,
            description: self.description,
            property_type: PropertyType::from_str(&self.property_type),
            status: ListingStatus::from_str(&self.status),
            price_cents: self.price_cents,
            address: self.address,
            city: self.city,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            area_sqm: self.area_sqm,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const LISTING_COLUMNS: &str = "id, agent_id, seller_id, title, description, property_type, \
                               status, price_cents, address, city, bedrooms, bathrooms, \
                               area_sqm, created_at, updated_at";

#[async_trait]
impl ListingRepository for PgListingRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Listing>, AppError> {
        let sql = format!("SELECT {} FROM listings WHERE id = $1", LISTING_COLUMNS);
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_listing()))
    }

    /// Search active listings with filters.
    ///
    /// Only `active` listings appear in public search. Results are newest
    /// first with keyset pagination on the snowflake ID.
    async fn search(&self, filter: &ListingFilter) -> Result<Vec<Listing>, AppError> {
        // Cap limit to prevent excessive queries
        let limit = filter.limit.clamp(1, 100);

        let mut query = QueryBuilder::new(format!(
            "SELECT {} FROM listings WHERE status = 'active'",
            LISTING_COLUMNS
        ));

        if let Some(city) = &filter.city {
            query.push(" AND city ILIKE ").push_bind(city.clone());
        }
        if let Some(property_type) = filter.property_type {
            query
                .push(" AND property_type = ")
                .push_bind(property_type.as_str());
        }
        if let Some(min) = filter.min_price_cents {
            query.push(" AND price_cents >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price_cents {
            query.push(" AND price_cents <= ").push_bind(max);
        }
        if let Some(min_bedrooms) = filter.min_bedrooms {
            query.push(" AND bedrooms >= ").push_bind(min_bedrooms);
        }
        if let Some(before) = filter.before {
            query.push(" AND id < ").push_bind(before);
        }

        query.push(" ORDER BY id DESC LIMIT ").push_bind(limit);

        let rows: Vec<ListingRow> = query.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|r| r.into_listing()).collect())
    }

    async fn find_by_agent(&self, agent_id: i64) -> Result<Vec<Listing>, AppError> {
        let sql = format!(
            "SELECT {} FROM listings WHERE agent_id = $1 ORDER BY id DESC",
            LISTING_COLUMNS
        );
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(agent_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into_listing()).collect())
    }

    /// Create a new listing.
    ///
    /// The ID should be a pre-generated Snowflake ID from the application layer.
    async fn create(&self, listing: &Listing) -> Result<Listing, AppError> {
        let sql = format!(
            r#"
            INSERT INTO listings (id, agent_id, seller_id, title, description, property_type,
                                  status, price_cents, address, city, bedrooms, bathrooms, area_sqm)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            LISTING_COLUMNS
        );
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(listing.id)
            .bind(listing.agent_id)
            .bind(listing.seller_id)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(listing.property_type.as_str())
            .bind(listing.status.as_str())
            .bind(listing.price_cents)
            .bind(&listing.address)
            .bind(&listing.city)
            .bind(listing.bedrooms)
            .bind(listing.bathrooms)
            .bind(listing.area_sqm)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into_listing())
    }

    async fn update(&self, listing: &Listing) -> Result<Listing, AppError> {
        let sql = format!(
            r#"
            UPDATE listings
            SET title = $2, description = $3, property_type = $4, status = $5,
                price_cents = $6, address = $7, city = $8, bedrooms = $9,
                bathrooms = $10, area_sqm = $11, seller_id = $12, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            LISTING_COLUMNS
        );
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(listing.id)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(listing.property_type.as_str())
            .bind(listing.status.as_str())
            .bind(listing.price_cents)
            .bind(&listing.address)
            .bind(&listing.city)
            .bind(listing.bedrooms)
            .bind(listing.bathrooms)
            .bind(listing.area_sqm)
            .bind(listing.seller_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into_listing())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Listing {} not found", id)));
        }

        Ok(())
    }
}
