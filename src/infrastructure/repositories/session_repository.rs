//! Session Repository Implementation
//!
//! PostgreSQL implementation of refresh-token session storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Party, Role, Session, SessionRepository};
use crate::shared::error::AppError;

/// PostgreSQL session repository implementation.
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Creates a new PgSessionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for session queries.
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    account_role: String,
    account_id: i64,
    refresh_token_hash: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> Session {
        Session {
            id: self.id,
            account_role: Role::from_str(&self.account_role).unwrap_or(Role::Buyer),
            account_id: self.account_id,
            refresh_token_hash: self.refresh_token_hash,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, account_role, account_id, refresh_token_hash, expires_at, created_at
            FROM sessions
            WHERE refresh_token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_session()))
    }

    async fn create(&self, session: &Session) -> Result<Session, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions (id, account_role, account_id, refresh_token_hash, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, account_role, account_id, refresh_token_hash, expires_at, created_at
            "#,
        )
        .bind(session.id)
        .bind(session.account_role.as_str())
        .bind(session.account_id)
        .bind(&session.refresh_token_hash)
        .bind(session.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_session())
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE refresh_token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_for_account(&self, account: Party) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE account_role = $1 AND account_id = $2")
            .bind(account.role.as_str())
            .bind(account.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
