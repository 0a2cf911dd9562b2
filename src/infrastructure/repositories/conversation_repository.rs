//! Conversation Repository Implementation
//!
//! PostgreSQL implementation of conversation operations, including the
//! idempotency lookup used when opening a thread and the per-side unread
//! counter reset.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{ContactRole, Conversation, ConversationRepository, Party, Role};
use crate::shared::error::AppError;

/// PostgreSQL conversation repository implementation.
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    /// Creates a new PgConversationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for conversation queries.
#[derive(Debug, sqlx::FromRow)]
struct ConversationRow {
    id: i64,
    agent_id: i64,
    contact_role: String,
    contact_id: i64,
    listing_id: Option<i64>,
    agent_unread: i32,
    contact_unread: i32,
    last_message_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl ConversationRow {
    /// Converts database row to domain Conversation entity.
    fn into_conversation(self) -> Conversation {
        Conversation {
            id: self.id,
            agent_id: self.agent_id,
            // The column carries a CHECK constraint, so the fallback never fires in practice
            contact_role: ContactRole::from_str(&self.contact_role).unwrap_or(ContactRole::Buyer),
            contact_id: self.contact_id,
            listing_id: self.listing_id,
            agent_unread: self.agent_unread,
            contact_unread: self.contact_unread,
            last_message_at: self.last_message_at,
            created_at: self.created_at,
        }
    }
}

const CONVERSATION_COLUMNS: &str = "id, agent_id, contact_role, contact_id, listing_id, \
                                    agent_unread, contact_unread, last_message_at, created_at";

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Conversation>, AppError> {
        let sql = format!(
            "SELECT {} FROM conversations WHERE id = $1",
            CONVERSATION_COLUMNS
        );
        let row = sqlx::query_as::<_, ConversationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_conversation()))
    }

    async fn find_by_pair(
        &self,
        agent_id: i64,
        contact_role: ContactRole,
        contact_id: i64,
        listing_id: Option<i64>,
    ) -> Result<Option<Conversation>, AppError> {
        // IS NOT DISTINCT FROM treats two NULL listing ids as the same thread
        let sql = format!(
            r#"
            SELECT {}
            FROM conversations
            WHERE agent_id = $1 AND contact_role = $2 AND contact_id = $3
              AND listing_id IS NOT DISTINCT FROM $4
            "#,
            CONVERSATION_COLUMNS
        );
        let row = sqlx::query_as::<_, ConversationRow>(&sql)
            .bind(agent_id)
            .bind(contact_role.as_str())
            .bind(contact_id)
            .bind(listing_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_conversation()))
    }

    /// List a participant's conversations, most recently active first.
    ///
    /// Threads with no messages yet sort last by creation time.
    async fn find_for_party(&self, party: Party) -> Result<Vec<Conversation>, AppError> {
        let rows = match party.role {
            Role::Agent => {
                let sql = format!(
                    r#"
                    SELECT {}
                    FROM conversations
                    WHERE agent_id = $1
                    ORDER BY last_message_at DESC NULLS LAST, created_at DESC
                    "#,
                    CONVERSATION_COLUMNS
                );
                sqlx::query_as::<_, ConversationRow>(&sql)
                    .bind(party.id)
                    .fetch_all(&self.pool)
                    .await?
            }
            role => {
                let sql = format!(
                    r#"
                    SELECT {}
                    FROM conversations
                    WHERE contact_role = $1 AND contact_id = $2
                    ORDER BY last_message_at DESC NULLS LAST, created_at DESC
                    "#,
                    CONVERSATION_COLUMNS
                );
                sqlx::query_as::<_, ConversationRow>(&sql)
                    .bind(role.as_str())
                    .bind(party.id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(|r| r.into_conversation()).collect())
    }

    /// Create a new conversation.
    ///
    /// The ID should be a pre-generated Snowflake ID from the application layer.
    async fn create(&self, conversation: &Conversation) -> Result<Conversation, AppError> {
        let sql = format!(
            r#"
            INSERT INTO conversations (id, agent_id, contact_role, contact_id, listing_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            CONVERSATION_COLUMNS
        );
        let row = sqlx::query_as::<_, ConversationRow>(&sql)
            .bind(conversation.id)
            .bind(conversation.agent_id)
            .bind(conversation.contact_role.as_str())
            .bind(conversation.contact_id)
            .bind(conversation.listing_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into_conversation())
    }

    async fn mark_read(&self, id: i64, reader: Party) -> Result<(), AppError> {
        let sql = if reader.role == Role::Agent {
            "UPDATE conversations SET agent_unread = 0 WHERE id = $1"
        } else {
            "UPDATE conversations SET contact_unread = 0 WHERE id = $1"
        };
        let result = sqlx::query(sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Conversation {} not found", id)));
        }

        Ok(())
    }
}
