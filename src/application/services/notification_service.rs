//! Notification Service
//!
//! Listing and read-state management for per-account notifications. Records
//! are created by the showing and chat services; this service only reads and
//! flips read flags.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Notification, NotificationRepository, Party};

/// Notification service trait
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// List the actor's notifications, newest first
    async fn list(&self, actor: Party, limit: Option<i32>)
        -> Result<Vec<Notification>, NotificationError>;

    /// Count the actor's unread notifications
    async fn unread_count(&self, actor: Party) -> Result<i64, NotificationError>;

    /// Mark one of the actor's notifications read
    async fn mark_read(&self, actor: Party, id: i64) -> Result<(), NotificationError>;

    /// Mark all of the actor's notifications read
    async fn mark_all_read(&self, actor: Party) -> Result<(), NotificationError>;
}

/// Notification service errors
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

const DEFAULT_LIMIT: i32 = 50;

/// NotificationService implementation
pub struct NotificationServiceImpl<N>
where
    N: NotificationRepository,
{
    notification_repo: Arc<N>,
}

impl<N> NotificationServiceImpl<N>
where
    N: NotificationRepository,
{
    pub fn new(notification_repo: Arc<N>) -> Self {
        Self { notification_repo }
    }
}

#[async_trait]
impl<N> NotificationService for NotificationServiceImpl<N>
where
    N: NotificationRepository + 'static,
{
    async fn list(
        &self,
        actor: Party,
        limit: Option<i32>,
    ) -> Result<Vec<Notification>, NotificationError> {
        self.notification_repo
            .find_for_recipient(actor, limit.unwrap_or(DEFAULT_LIMIT))
            .await
            .map_err(|e| NotificationError::Internal(e.to_string()))
    }

    async fn unread_count(&self, actor: Party) -> Result<i64, NotificationError> {
        self.notification_repo
            .count_unread(actor)
            .await
            .map_err(|e| NotificationError::Internal(e.to_string()))
    }

    async fn mark_read(&self, actor: Party, id: i64) -> Result<(), NotificationError> {
        self.notification_repo
            .mark_read(id, actor)
            .await
            .map_err(|e| match e {
                crate::shared::error::AppError::NotFound(_) => NotificationError::NotFound,
                other => NotificationError::Internal(other.to_string()),
            })
    }

    async fn mark_all_read(&self, actor: Party) -> Result<(), NotificationError> {
        self.notification_repo
            .mark_all_read(actor)
            .await
            .map_err(|e| NotificationError::Internal(e.to_string()))
    }
}
