//! ShowingSchedule entity and repository trait.
//!
//! Maps to the `showing_schedules` table. A showing is a buyer's request to
//! tour a listing; its status walks a fixed lifecycle enforced by
//! [`ShowingStatus::can_transition_to`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Showing lifecycle status.
///
/// ```text
/// pending -> accepted | declined
/// accepted -> completed | cancelled
/// ```
/// Declined, completed and cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShowingStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Completed,
    Cancelled,
}

impl ShowingStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "accepted" => Self::Accepted,
            "declined" => Self::Declined,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the lifecycle permits moving to `next`.
    pub fn can_transition_to(&self, next: ShowingStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted)
                | (Self::Pending, Self::Declined)
                | (Self::Accepted, Self::Completed)
                | (Self::Accepted, Self::Cancelled)
        )
    }

    /// Whether the status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for ShowingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a showing request for a listing.
///
/// Maps to the `showing_schedules` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - listing_id: BIGINT NOT NULL REFERENCES listings(id)
/// - agent_id: BIGINT NOT NULL REFERENCES agents(id)
/// - buyer_id: BIGINT NOT NULL REFERENCES buyers(id)
/// - status: VARCHAR(20) NOT NULL DEFAULT 'pending'
/// - scheduled_start / scheduled_end: TIMESTAMPTZ NOT NULL
/// - note: TEXT NULL               -- buyer's note with the request
/// - decline_reason: TEXT NULL     -- set when the agent declines
/// - created_at / updated_at: TIMESTAMPTZ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowingSchedule {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Listing being toured
    pub listing_id: i64,

    /// Agent responsible for the listing
    pub agent_id: i64,

    /// Buyer requesting the tour
    pub buyer_id: i64,

    /// Current lifecycle status
    pub status: ShowingStatus,

    /// Requested window start
    pub scheduled_start: DateTime<Utc>,

    /// Requested window end
    pub scheduled_end: DateTime<Utc>,

    /// Optional note from the buyer
    pub note: Option<String>,

    /// Reason given when declined
    pub decline_reason: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ShowingSchedule {
    /// Whether the account is a participant of this showing.
    pub fn involves(&self, agent_id: Option<i64>, buyer_id: Option<i64>) -> bool {
        agent_id.is_some_and(|id| id == self.agent_id)
            || buyer_id.is_some_and(|id| id == self.buyer_id)
    }
}

/// Repository trait for ShowingSchedule data access operations.
#[async_trait]
pub trait ShowingRepository: Send + Sync {
    /// Find a showing by its Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<ShowingSchedule>, AppError>;

    /// Find showings where the agent is responsible, newest first.
    async fn find_by_agent(&self, agent_id: i64) -> Result<Vec<ShowingSchedule>, AppError>;

    /// Find showings requested by the buyer, newest first.
    async fn find_by_buyer(&self, buyer_id: i64) -> Result<Vec<ShowingSchedule>, AppError>;

    /// Find showings for a listing, newest first.
    async fn find_by_listing(&self, listing_id: i64) -> Result<Vec<ShowingSchedule>, AppError>;

    /// Create a new showing request.
    async fn create(&self, showing: &ShowingSchedule) -> Result<ShowingSchedule, AppError>;

    /// Persist a status change (and optional decline reason).
    async fn update_status(
        &self,
        id: i64,
        status: ShowingStatus,
        decline_reason: Option<&str>,
    ) -> Result<ShowingSchedule, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ShowingStatus::Pending, ShowingStatus::Accepted, true)]
    #[test_case(ShowingStatus::Pending, ShowingStatus::Declined, true)]
    #[test_case(ShowingStatus::Accepted, ShowingStatus::Completed, true)]
    #[test_case(ShowingStatus::Accepted, ShowingStatus::Cancelled, true)]
    #[test_case(ShowingStatus::Pending, ShowingStatus::Completed, false)]
    #[test_case(ShowingStatus::Pending, ShowingStatus::Cancelled, false)]
    #[test_case(ShowingStatus::Declined, ShowingStatus::Accepted, false)]
    #[test_case(ShowingStatus::Completed, ShowingStatus::Cancelled, false)]
    #[test_case(ShowingStatus::Cancelled, ShowingStatus::Completed, false)]
    #[test_case(ShowingStatus::Accepted, ShowingStatus::Accepted, false)]
    fn test_transition_table(from: ShowingStatus, to: ShowingStatus, allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!ShowingStatus::Pending.is_terminal());
        assert!(!ShowingStatus::Accepted.is_terminal());
        assert!(ShowingStatus::Declined.is_terminal());
        assert!(ShowingStatus::Completed.is_terminal());
        assert!(ShowingStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            ShowingStatus::Pending,
            ShowingStatus::Accepted,
            ShowingStatus::Declined,
            ShowingStatus::Completed,
            ShowingStatus::Cancelled,
        ] {
            assert_eq!(ShowingStatus::from_str(status.as_str()), status);
        }
    }
}
