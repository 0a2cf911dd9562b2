//! Showing Repository Implementation
//!
//! PostgreSQL implementation of showing-schedule operations. Status
//! transition rules are enforced by the service layer; the repository only
//! persists the result.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{ShowingRepository, ShowingSchedule, ShowingStatus};
use crate::shared::error::AppError;

/// PostgreSQL showing repository implementation.
pub struct PgShowingRepository {
    pool: PgPool,
}

impl PgShowingRepository {
    /// Creates a new PgShowingRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for showing queries.
#[derive(Debug, sqlx::FromRow)]
struct ShowingRow {
    id: i64,
    listing_id: i64,
    agent_id: i64,
    buyer_id: i64,
    status: String,
    scheduled_start: DateTime<Utc>,
    scheduled_end: DateTime<Utc>,
    note: Option<String>,
    decline_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ShowingRow {
    /// Converts database row to domain ShowingSchedule entity.
    fn into_showing(self) -> ShowingSchedule {
        ShowingSchedule {
            id: self.id,
            listing_id: self.listing_id,
            agent_id: self.agent_id,
            buyer_id: self.buyer_id,
            status: ShowingStatus::from_str(&self.status),
            scheduled_start: self.scheduled_start,
            scheduled_end: self.scheduled_end,
            note: self.note,
            decline_reason: self.decline_reason,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const SHOWING_COLUMNS: &str = "id, listing_id, agent_id, buyer_id, status, scheduled_start, \
                               scheduled_end, note, decline_reason, created_at, updated_at";

#[async_trait]
impl ShowingRepository for PgShowingRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<ShowingSchedule>, AppError> {
        let sql = format!(
            "SELECT {} FROM showing_schedules WHERE id = $1",
            SHOWING_COLUMNS
        );
        let row = sqlx::query_as::<_, ShowingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_showing()))
    }

    async fn find_by_agent(&self, agent_id: i64) -> Result<Vec<ShowingSchedule>, AppError> {
        let sql = format!(
            "SELECT {} FROM showing_schedules WHERE agent_id = $1 ORDER BY id DESC",
            SHOWING_COLUMNS
        );
        let rows = sqlx::query_as::<_, ShowingRow>(&sql)
            .bind(agent_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into_showing()).collect())
    }

    async fn find_by_buyer(&self, buyer_id: i64) -> Result<Vec<ShowingSchedule>, AppError> {
        let sql = format!(
            "SELECT {} FROM showing_schedules WHERE buyer_id = $1 ORDER BY id DESC",
            SHOWING_COLUMNS
        );
        let rows = sqlx::query_as::<_, ShowingRow>(&sql)
            .bind(buyer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into_showing()).collect())
    }

    async fn find_by_listing(&self, listing_id: i64) -> Result<Vec<ShowingSchedule>, AppError> {
        let sql = format!(
            "SELECT {} FROM showing_schedules WHERE listing_id = $1 ORDER BY id DESC",
            SHOWING_COLUMNS
        );
        let rows = sqlx::query_as::<_, ShowingRow>(&sql)
            .bind(listing_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into_showing()).collect())
    }

    /// Create a new showing request.
    ///
    /// The ID should be a pre-generated Snowflake ID from the application layer.
    async fn create(&self, showing: &ShowingSchedule) -> Result<ShowingSchedule, AppError> {
        let sql = format!(
            r#"
            INSERT INTO showing_schedules (id, listing_id, agent_id, buyer_id, status,
                                           scheduled_start, scheduled_end, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            SHOWING_COLUMNS
        );
        let row = sqlx::query_as::<_, ShowingRow>(&sql)
            .bind(showing.id)
            .bind(showing.listing_id)
            .bind(showing.agent_id)
            .bind(showing.buyer_id)
            .bind(showing.status.as_str())
            .bind(showing.scheduled_start)
            .bind(showing.scheduled_end)
            .bind(&showing.note)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into_showing())
    }

    async fn update_status(
        &self,
        id: i64,
        status: ShowingStatus,
        decline_reason: Option<&str>,
    ) -> Result<ShowingSchedule, AppError> {
        let sql = format!(
            r#"
            UPDATE showing_schedules
            SET status = $2, decline_reason = COALESCE($3, decline_reason), updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SHOWING_COLUMNS
        );
        let row = sqlx::query_as::<_, ShowingRow>(&sql)
            .bind(id)
            .bind(status.as_str())
            .bind(decline_reason)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_showing())
            .ok_or_else(|| AppError::NotFound(format!("Showing {} not found", id)))
    }
}
