//! Conversation entity and repository trait.
//!
//! Maps to the `conversations` table. A conversation is scoped to exactly one
//! agent and one contact (a seller or a buyer) and carries one unread counter
//! per side. Counters are mutated in the same transaction as message inserts
//! so REST pollers and socket subscribers always agree.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ContactRole, Party, Role};
use crate::shared::error::AppError;

/// Represents a chat thread between an agent and a contact.
///
/// Maps to the `conversations` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - agent_id: BIGINT NOT NULL REFERENCES agents(id)
/// - contact_role: VARCHAR(10) NOT NULL  -- 'seller' | 'buyer'
/// - contact_id: BIGINT NOT NULL
/// - listing_id: BIGINT NULL REFERENCES listings(id)
/// - agent_unread: INT NOT NULL DEFAULT 0
/// - contact_unread: INT NOT NULL DEFAULT 0
/// - last_message_at: TIMESTAMPTZ NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Agent side of the thread
    pub agent_id: i64,

    /// Which table the contact lives in
    pub contact_role: ContactRole,

    /// Contact side of the thread
    pub contact_id: i64,

    /// Listing the thread is about, when any
    pub listing_id: Option<i64>,

    /// Messages the agent has not read yet
    pub agent_unread: i32,

    /// Messages the contact has not read yet
    pub contact_unread: i32,

    /// Timestamp of the newest message
    pub last_message_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Whether the party participates in this conversation.
    pub fn is_participant(&self, party: Party) -> bool {
        match party.role {
            Role::Agent => party.id == self.agent_id,
            role => {
                party.id == self.contact_id && Role::from(self.contact_role) == role
            }
        }
    }

    /// The counterpart of the given participant.
    ///
    /// Returns `None` when the party is not a participant at all.
    pub fn counterpart_of(&self, party: Party) -> Option<Party> {
        if !self.is_participant(party) {
            return None;
        }
        if party.role == Role::Agent {
            Some(Party::new(self.contact_role.into(), self.contact_id))
        } else {
            Some(Party::new(Role::Agent, self.agent_id))
        }
    }

    /// Unread count for the given participant's side.
    pub fn unread_for(&self, party: Party) -> i32 {
        if party.role == Role::Agent {
            self.agent_unread
        } else {
            self.contact_unread
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self {
            id: 0,
            agent_id: 0,
            contact_role: ContactRole::Buyer,
            contact_id: 0,
            listing_id: None,
            agent_unread: 0,
            contact_unread: 0,
            last_message_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for Conversation data access operations.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Find a conversation by its Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Conversation>, AppError>;

    /// Find the conversation between a pair (and listing), if one exists.
    ///
    /// This is the idempotency lookup used by `open_conversation`.
    async fn find_by_pair(
        &self,
        agent_id: i64,
        contact_role: ContactRole,
        contact_id: i64,
        listing_id: Option<i64>,
    ) -> Result<Option<Conversation>, AppError>;

    /// List a participant's conversations, most recently active first.
    async fn find_for_party(&self, party: Party) -> Result<Vec<Conversation>, AppError>;

    /// Create a new conversation.
    async fn create(&self, conversation: &Conversation) -> Result<Conversation, AppError>;

    /// Reset the unread counter for the given participant's side.
    async fn mark_read(&self, id: i64, reader: Party) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conversation() -> Conversation {
        Conversation {
            id: 1,
            agent_id: 10,
            contact_role: ContactRole::Buyer,
            contact_id: 20,
            agent_unread: 3,
            contact_unread: 1,
            ..Conversation::default()
        }
    }

    #[test]
    fn test_is_participant() {
        let conv = test_conversation();
        assert!(conv.is_participant(Party::new(Role::Agent, 10)));
        assert!(conv.is_participant(Party::new(Role::Buyer, 20)));
        // Same ID but wrong table is not a participant
        assert!(!conv.is_participant(Party::new(Role::Seller, 20)));
        assert!(!conv.is_participant(Party::new(Role::Agent, 99)));
        assert!(!conv.is_participant(Party::new(Role::Buyer, 10)));
    }

    #[test]
    fn test_counterpart_of() {
        let conv = test_conversation();
        assert_eq!(
            conv.counterpart_of(Party::new(Role::Agent, 10)),
            Some(Party::new(Role::Buyer, 20))
        );
        assert_eq!(
            conv.counterpart_of(Party::new(Role::Buyer, 20)),
            Some(Party::new(Role::Agent, 10))
        );
        assert_eq!(conv.counterpart_of(Party::new(Role::Seller, 20)), None);
    }

    #[test]
    fn test_unread_for_sides() {
        let conv = test_conversation();
        assert_eq!(conv.unread_for(Party::new(Role::Agent, 10)), 3);
        assert_eq!(conv.unread_for(Party::new(Role::Buyer, 20)), 1);
    }
}
