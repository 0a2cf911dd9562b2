//! ChatMessage entity and repository trait.
//!
//! Maps to the `messages` table in the database schema. Message order is the
//! snowflake ID order; history pagination is keyset-based on it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Party, Role};
use crate::shared::error::AppError;

/// Maximum message content length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// Represents a message in a conversation.
///
/// Maps to the `messages` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - conversation_id: BIGINT NOT NULL REFERENCES conversations(id)
/// - sender_role: VARCHAR(10) NOT NULL -- 'agent' | 'seller' | 'buyer'
/// - sender_id: BIGINT NOT NULL
/// - content: TEXT NOT NULL (max 4000 characters)
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Conversation this message belongs to
    pub conversation_id: i64,

    /// Role of the sending account
    pub sender_role: Role,

    /// ID of the sending account
    pub sender_id: i64,

    /// Message text (up to 4000 characters)
    pub content: String,

    /// Timestamp when the message was sent
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// The sending account as a party reference.
    pub fn sender(&self) -> Party {
        Party::new(self.sender_role, self.sender_id)
    }

    /// Get the content length in characters.
    pub fn content_length(&self) -> usize {
        self.content.chars().count()
    }
}

/// Repository trait for ChatMessage data access operations.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find a message by its Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<ChatMessage>, AppError>;

    /// Find messages in a conversation with keyset pagination.
    ///
    /// - `before`: return messages older than this message ID
    /// - `limit`: maximum number of messages to return (capped)
    ///
    /// Messages are returned oldest-first within the selected window so
    /// clients can append them in order.
    async fn find_by_conversation(
        &self,
        conversation_id: i64,
        before: Option<i64>,
        limit: i32,
    ) -> Result<Vec<ChatMessage>, AppError>;

    /// Persist a message and bump the counterpart's unread counter and the
    /// conversation's `last_message_at` in one transaction.
    async fn create(&self, message: &ChatMessage) -> Result<ChatMessage, AppError>;

    /// Get the count of messages in a conversation.
    async fn count_by_conversation(&self, conversation_id: i64) -> Result<i64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_party() {
        let message = ChatMessage {
            id: 1,
            conversation_id: 2,
            sender_role: Role::Seller,
            sender_id: 7,
            content: "hello".into(),
            created_at: Utc::now(),
        };
        assert_eq!(message.sender(), Party::new(Role::Seller, 7));
    }

    #[test]
    fn test_content_length_counts_chars() {
        let message = ChatMessage {
            id: 1,
            conversation_id: 2,
            sender_role: Role::Agent,
            sender_id: 1,
            content: "héllo".into(),
            created_at: Utc::now(),
        };
        assert_eq!(message.content_length(), 5);
    }
}
