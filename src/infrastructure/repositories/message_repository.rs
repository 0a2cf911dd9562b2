//! Message Repository Implementation
//!
//! PostgreSQL implementation of chat message operations with keyset
//! pagination. The insert runs in one transaction with the conversation's
//! unread-counter bump so no reader can observe a message without its
//! counter update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{ChatMessage, MessageRepository, Role};
use crate::shared::error::AppError;

/// PostgreSQL message repository implementation.
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Creates a new PgMessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    conversation_id: i64,
    sender_role: String,
    sender_id: i64,
    content: String,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    /// Converts database row to domain ChatMessage entity.
    fn into_message(self) -> ChatMessage {
        ChatMessage {
            id: self.id,
            conversation_id: self.conversation_id,
            // CHECK constraint on the column keeps the fallback theoretical
            sender_role: Role::from_str(&self.sender_role).unwrap_or(Role::Agent),
            sender_id: self.sender_id,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<ChatMessage>, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, conversation_id, sender_role, sender_id, content, created_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_message()))
    }

    /// Find messages in a conversation with keyset pagination.
    ///
    /// The window is selected newest-first, then reversed so callers get
    /// oldest-first within the page and can append in display order.
    async fn find_by_conversation(
        &self,
        conversation_id: i64,
        before: Option<i64>,
        limit: i32,
    ) -> Result<Vec<ChatMessage>, AppError> {
        // Cap limit to prevent excessive queries
        let limit = limit.clamp(1, 100);

        let rows = match before {
            Some(before_id) => {
                sqlx::query_as::<_, MessageRow>(
                    r#"
                    SELECT id, conversation_id, sender_role, sender_id, content, created_at
                    FROM messages
                    WHERE conversation_id = $1 AND id < $2
                    ORDER BY id DESC
                    LIMIT $3
                    "#,
                )
                .bind(conversation_id)
                .bind(before_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, MessageRow>(
                    r#"
                    SELECT id, conversation_id, sender_role, sender_id, content, created_at
                    FROM messages
                    WHERE conversation_id = $1
                    ORDER BY id DESC
                    LIMIT $2
                    "#,
                )
                .bind(conversation_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut messages: Vec<ChatMessage> = rows.into_iter().map(|r| r.into_message()).collect();
        messages.reverse();
        Ok(messages)
    }

    /// Persist a message and bump the counterpart's unread counter.
    ///
    /// The unread column to bump is the side opposite the sender: an agent's
    /// message bumps `contact_unread`, a contact's message bumps
    /// `agent_unread`.
    async fn create(&self, message: &ChatMessage) -> Result<ChatMessage, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (id, conversation_id, sender_role, sender_id, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, conversation_id, sender_role, sender_id, content, created_at
            "#,
        )
        .bind(message.id)
        .bind(message.conversation_id)
        .bind(message.sender_role.as_str())
        .bind(message.sender_id)
        .bind(&message.content)
        .fetch_one(&mut *tx)
        .await?;

        let counter_sql = if message.sender_role == Role::Agent {
            r#"
            UPDATE conversations
            SET contact_unread = contact_unread + 1, last_message_at = $2
            WHERE id = $1
            "#
        } else {
            r#"
            UPDATE conversations
            SET agent_unread = agent_unread + 1, last_message_at = $2
            WHERE id = $1
            "#
        };

        sqlx::query(counter_sql)
            .bind(message.conversation_id)
            .bind(row.created_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into_message())
    }

    async fn count_by_conversation(&self, conversation_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE conversation_id = $1",
        )
        .bind(conversation_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
