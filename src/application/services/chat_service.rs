//! Chat Service
//!
//! Conversation and message operations shared by the REST API and the
//! WebSocket channel. Both transports call the same persistence path, so
//! unread counters and message order agree no matter how a client connects.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::config::ChatSettings;
use crate::domain::{
    AccountRepository, ChatMessage, ContactRole, Conversation, ConversationRepository,
    MessageRepository, Notification, NotificationKind, NotificationRepository, Party,
    MAX_MESSAGE_LENGTH,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Chat service trait
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Open (or return the existing) conversation between the actor and the
    /// other party, optionally attached to a listing
    async fn open_conversation(
        &self,
        actor: Party,
        other: Party,
        listing_id: Option<i64>,
    ) -> Result<Conversation, ChatError>;

    /// List the actor's conversations, most recently active first
    async fn list_conversations(&self, actor: Party) -> Result<Vec<Conversation>, ChatError>;

    /// Fetch one conversation after verifying the actor participates in it.
    ///
    /// This is also the WebSocket access guard.
    async fn get_conversation(&self, actor: Party, id: i64) -> Result<Conversation, ChatError>;

    /// Persist a message and create a notification for the counterpart.
    ///
    /// Fan-out to connected sockets is the transport layer's job; the
    /// returned [`SentMessage`] names the counterpart so the caller can
    /// route the push.
    async fn send_message(
        &self,
        actor: Party,
        conversation_id: i64,
        content: &str,
    ) -> Result<SentMessage, ChatError>;

    /// Fetch message history (oldest-first within the page) and reset the
    /// actor's unread counter
    async fn history(
        &self,
        actor: Party,
        conversation_id: i64,
        before: Option<i64>,
        limit: Option<i32>,
    ) -> Result<Vec<ChatMessage>, ChatError>;

    /// Reset the actor's unread counter
    async fn mark_read(&self, actor: Party, conversation_id: i64) -> Result<(), ChatError>;
}

/// A persisted message plus routing info for real-time fan-out
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub message: ChatMessage,
    pub counterpart: Party,
}

/// Chat service errors
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Conversation not found")]
    NotFound,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Not a participant of this conversation")]
    Forbidden,

    #[error("A conversation needs exactly one agent")]
    InvalidPair,

    #[error("Message content must not be empty")]
    EmptyMessage,

    #[error("Message content is too long")]
    ContentTooLong,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// ChatService implementation
pub struct ChatServiceImpl<C, M, A, N>
where
    C: ConversationRepository,
    M: MessageRepository,
    A: AccountRepository,
    N: NotificationRepository,
{
    conversation_repo: Arc<C>,
    message_repo: Arc<M>,
    account_repo: Arc<A>,
    notification_repo: Arc<N>,
    id_generator: Arc<SnowflakeGenerator>,
    settings: ChatSettings,
}

impl<C, M, A, N> ChatServiceImpl<C, M, A, N>
where
    C: ConversationRepository,
    M: MessageRepository,
    A: AccountRepository,
    N: NotificationRepository,
{
    pub fn new(
        conversation_repo: Arc<C>,
        message_repo: Arc<M>,
        account_repo: Arc<A>,
        notification_repo: Arc<N>,
        id_generator: Arc<SnowflakeGenerator>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            conversation_repo,
            message_repo,
            account_repo,
            notification_repo,
            id_generator,
            settings,
        }
    }

    /// Split a pair of parties into (agent_id, contact); rejects pairs
    /// without exactly one agent.
    fn split_pair(a: Party, b: Party) -> Result<(i64, Party), ChatError> {
        match (a.is_agent(), b.is_agent()) {
            (true, false) => Ok((a.id, b)),
            (false, true) => Ok((b.id, a)),
            _ => Err(ChatError::InvalidPair),
        }
    }

    /// Whether a repository error is the pair index rejecting a duplicate.
    fn is_unique_violation(e: &AppError) -> bool {
        matches!(
            e,
            AppError::Database(sqlx::Error::Database(db)) if db.is_unique_violation()
        )
    }

    async fn account_exists(&self, party: Party) -> Result<bool, ChatError> {
        Ok(self
            .account_repo
            .find_by_id(party.role, party.id)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?
            .is_some())
    }
}

#[async_trait]
impl<C, M, A, N> ChatService for ChatServiceImpl<C, M, A, N>
where
    C: ConversationRepository + 'static,
    M: MessageRepository + 'static,
    A: AccountRepository + 'static,
    N: NotificationRepository + 'static,
{
    async fn open_conversation(
        &self,
        actor: Party,
        other: Party,
        listing_id: Option<i64>,
    ) -> Result<Conversation, ChatError> {
        let (agent_id, contact) = Self::split_pair(actor, other)?;
        let contact_role =
            ContactRole::try_from(contact.role).map_err(|_| ChatError::InvalidPair)?;

        if !self.account_exists(other).await? {
            return Err(ChatError::AccountNotFound);
        }

        // Idempotent open: an existing thread for the pair is returned as-is
        if let Some(existing) = self
            .conversation_repo
            .find_by_pair(agent_id, contact_role, contact.id, listing_id)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?
        {
            return Ok(existing);
        }

        let conversation = Conversation {
            id: self.id_generator.generate(),
            agent_id,
            contact_role,
            contact_id: contact.id,
            listing_id,
            agent_unread: 0,
            contact_unread: 0,
            last_message_at: None,
            created_at: Utc::now(),
        };

        match self.conversation_repo.create(&conversation).await {
            Ok(created) => Ok(created),
            // Lost a race with a concurrent open for the same pair; the
            // winner's row is the one to return
            Err(e) if Self::is_unique_violation(&e) => self
                .conversation_repo
                .find_by_pair(agent_id, contact_role, contact.id, listing_id)
                .await
                .map_err(|e| ChatError::Internal(e.to_string()))?
                .ok_or_else(|| ChatError::Internal("conversation missing after conflict".into())),
            Err(e) => Err(ChatError::Internal(e.to_string())),
        }
    }

    async fn list_conversations(&self, actor: Party) -> Result<Vec<Conversation>, ChatError> {
        self.conversation_repo
            .find_for_party(actor)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))
    }

    async fn get_conversation(&self, actor: Party, id: i64) -> Result<Conversation, ChatError> {
        let conversation = self
            .conversation_repo
            .find_by_id(id)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?
            .ok_or(ChatError::NotFound)?;

        if !conversation.is_participant(actor) {
            return Err(ChatError::Forbidden);
        }

        Ok(conversation)
    }

    async fn send_message(
        &self,
        actor: Party,
        conversation_id: i64,
        content: &str,
    ) -> Result<SentMessage, ChatError> {
        let conversation = self.get_conversation(actor, conversation_id).await?;

        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(ChatError::ContentTooLong);
        }

        // Participant check already passed, so a counterpart exists
        let counterpart = conversation
            .counterpart_of(actor)
            .ok_or(ChatError::Forbidden)?;

        let message = ChatMessage {
            id: self.id_generator.generate(),
            conversation_id,
            sender_role: actor.role,
            sender_id: actor.id,
            content: content.to_string(),
            created_at: Utc::now(),
        };

        let created = self
            .message_repo
            .create(&message)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;

        let notification = Notification {
            id: self.id_generator.generate(),
            recipient: counterpart,
            kind: NotificationKind::NewMessage,
            body: "You have a new message".to_string(),
            reference_id: Some(conversation_id),
            read: false,
            created_at: Utc::now(),
        };
        if let Err(e) = self.notification_repo.create(&notification).await {
            tracing::warn!(
                conversation_id,
                error = %e,
                "Failed to create message notification"
            );
        }

        Ok(SentMessage {
            message: created,
            counterpart,
        })
    }

    async fn history(
        &self,
        actor: Party,
        conversation_id: i64,
        before: Option<i64>,
        limit: Option<i32>,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        self.get_conversation(actor, conversation_id).await?;

        let limit = limit
            .unwrap_or(self.settings.history_limit)
            .clamp(1, self.settings.max_page_size);

        let messages = self
            .message_repo
            .find_by_conversation(conversation_id, before, limit)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;

        // Reading history counts as reading: same reset the socket's
        // mark_read performs
        self.conversation_repo
            .mark_read(conversation_id, actor)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))?;

        Ok(messages)
    }

    async fn mark_read(&self, actor: Party, conversation_id: i64) -> Result<(), ChatError> {
        self.get_conversation(actor, conversation_id).await?;

        self.conversation_repo
            .mark_read(conversation_id, actor)
            .await
            .map_err(|e| ChatError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    type Svc = ChatServiceImpl<
        crate::infrastructure::repositories::PgConversationRepository,
        crate::infrastructure::repositories::PgMessageRepository,
        crate::infrastructure::repositories::PgAccountRepository,
        crate::infrastructure::repositories::PgNotificationRepository,
    >;

    #[test]
    fn test_unique_violation_detection_ignores_other_errors() {
        assert!(!Svc::is_unique_violation(&AppError::NotFound("x".into())));
        assert!(!Svc::is_unique_violation(&AppError::Database(
            sqlx::Error::RowNotFound
        )));
    }

    #[test]
    fn test_split_pair_requires_exactly_one_agent() {
        let agent = Party::new(Role::Agent, 1);
        let buyer = Party::new(Role::Buyer, 2);
        let seller = Party::new(Role::Seller, 3);

        assert_eq!(Svc::split_pair(agent, buyer).unwrap(), (1, buyer));
        assert_eq!(Svc::split_pair(seller, agent).unwrap(), (1, seller));
        assert!(matches!(
            Svc::split_pair(buyer, seller),
            Err(ChatError::InvalidPair)
        ));
        assert!(matches!(
            Svc::split_pair(agent, Party::new(Role::Agent, 9)),
            Err(ChatError::InvalidPair)
        ));
    }
}
