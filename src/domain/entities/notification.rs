//! Notification entity and repository trait.
//!
//! Maps to the `notifications` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Party;
use crate::shared::error::AppError;

/// Notification kinds matching the VARCHAR constraint on `notifications.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A buyer requested a showing
    ShowingRequested,
    /// The agent accepted a showing
    ShowingAccepted,
    /// The agent declined a showing
    ShowingDeclined,
    /// A participant cancelled an accepted showing
    ShowingCancelled,
    /// A new chat message arrived
    NewMessage,
}

impl NotificationKind {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "showing_requested" => Some(Self::ShowingRequested),
            "showing_accepted" => Some(Self::ShowingAccepted),
            "showing_declined" => Some(Self::ShowingDeclined),
            "showing_cancelled" => Some(Self::ShowingCancelled),
            "new_message" => Some(Self::NewMessage),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShowingRequested => "showing_requested",
            Self::ShowingAccepted => "showing_accepted",
            Self::ShowingDeclined => "showing_declined",
            Self::ShowingCancelled => "showing_cancelled",
            Self::NewMessage => "new_message",
        }
    }
}

/// Represents a persistent notification for an account.
///
/// Maps to the `notifications` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - recipient_role: VARCHAR(10) NOT NULL
/// - recipient_id: BIGINT NOT NULL
/// - kind: VARCHAR(32) NOT NULL
/// - body: TEXT NOT NULL
/// - reference_id: BIGINT NULL  -- showing / conversation / listing id
/// - read: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Account the notification targets
    pub recipient: Party,

    /// What happened
    pub kind: NotificationKind,

    /// Human-readable summary
    pub body: String,

    /// ID of the record the notification refers to
    pub reference_id: Option<i64>,

    /// Whether the recipient has seen it
    pub read: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Repository trait for Notification data access operations.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// List a recipient's notifications, newest first.
    async fn find_for_recipient(
        &self,
        recipient: Party,
        limit: i32,
    ) -> Result<Vec<Notification>, AppError>;

    /// Count unread notifications for a recipient.
    async fn count_unread(&self, recipient: Party) -> Result<i64, AppError>;

    /// Create a notification.
    async fn create(&self, notification: &Notification) -> Result<Notification, AppError>;

    /// Mark one notification read; errors if it does not belong to the recipient.
    async fn mark_read(&self, id: i64, recipient: Party) -> Result<(), AppError>;

    /// Mark all of a recipient's notifications read.
    async fn mark_all_read(&self, recipient: Party) -> Result<(), AppError>;
}
