//! Showing Service
//!
//! Showing-schedule workflow: a buyer requests a tour, the listing's agent
//! accepts or declines, either participant can cancel an accepted showing and
//! the agent marks it completed. Every transition goes through the status
//! lifecycle table and produces a notification for the counterpart.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    ListingRepository, Notification, NotificationKind, NotificationRepository, Party, Role,
    ShowingRepository, ShowingSchedule, ShowingStatus,
};
use crate::shared::snowflake::SnowflakeGenerator;

/// Showing service trait
#[async_trait]
pub trait ShowingService: Send + Sync {
    /// Request a tour of a listing (buyers only)
    async fn request_showing(
        &self,
        actor: Party,
        request: RequestShowingDto,
    ) -> Result<ShowingSchedule, ShowingError>;

    /// Get one showing; the actor must be a participant
    async fn get_showing(&self, actor: Party, id: i64) -> Result<ShowingSchedule, ShowingError>;

    /// List showings the actor participates in, newest first
    async fn list_showings(&self, actor: Party) -> Result<Vec<ShowingSchedule>, ShowingError>;

    /// List showings for a listing the actor owns
    async fn listing_showings(
        &self,
        actor: Party,
        listing_id: i64,
    ) -> Result<Vec<ShowingSchedule>, ShowingError>;

    /// Accept a pending showing (listing agent only)
    async fn accept_showing(&self, actor: Party, id: i64) -> Result<ShowingSchedule, ShowingError>;

    /// Decline a pending showing (listing agent only)
    async fn decline_showing(
        &self,
        actor: Party,
        id: i64,
        reason: Option<String>,
    ) -> Result<ShowingSchedule, ShowingError>;

    /// Cancel an accepted showing (either participant)
    async fn cancel_showing(&self, actor: Party, id: i64) -> Result<ShowingSchedule, ShowingError>;

    /// Mark an accepted showing completed (listing agent only)
    async fn complete_showing(&self, actor: Party, id: i64)
        -> Result<ShowingSchedule, ShowingError>;
}

/// Request showing input
#[derive(Debug, Clone)]
pub struct RequestShowingDto {
    pub listing_id: i64,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub note: Option<String>,
}

/// Showing service errors
#[derive(Debug, thiserror::Error)]
pub enum ShowingError {
    #[error("Showing not found")]
    NotFound,

    #[error("Listing not found")]
    ListingNotFound,

    #[error("Listing is not open for showings")]
    ListingClosed,

    #[error("Permission denied")]
    Forbidden,

    #[error("Invalid time window")]
    InvalidWindow,

    #[error("Cannot move showing from {from} to {to}")]
    InvalidTransition {
        from: ShowingStatus,
        to: ShowingStatus,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// ShowingService implementation
pub struct ShowingServiceImpl<Sh, L, N>
where
    Sh: ShowingRepository,
    L: ListingRepository,
    N: NotificationRepository,
{
    showing_repo: Arc<Sh>,
    listing_repo: Arc<L>,
    notification_repo: Arc<N>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<Sh, L, N> ShowingServiceImpl<Sh, L, N>
where
    Sh: ShowingRepository,
    L: ListingRepository,
    N: NotificationRepository,
{
    pub fn new(
        showing_repo: Arc<Sh>,
        listing_repo: Arc<L>,
        notification_repo: Arc<N>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            showing_repo,
            listing_repo,
            notification_repo,
            id_generator,
        }
    }

    async fn find_showing(&self, id: i64) -> Result<ShowingSchedule, ShowingError> {
        self.showing_repo
            .find_by_id(id)
            .await
            .map_err(|e| ShowingError::Internal(e.to_string()))?
            .ok_or(ShowingError::NotFound)
    }

    /// Apply a lifecycle transition, or reject it.
    async fn transition(
        &self,
        showing: &ShowingSchedule,
        to: ShowingStatus,
        decline_reason: Option<&str>,
    ) -> Result<ShowingSchedule, ShowingError> {
        if !showing.status.can_transition_to(to) {
            return Err(ShowingError::InvalidTransition {
                from: showing.status,
                to,
            });
        }

        self.showing_repo
            .update_status(showing.id, to, decline_reason)
            .await
            .map_err(|e| ShowingError::Internal(e.to_string()))
    }

    /// Create a notification for the showing counterpart; failures are logged
    /// rather than failing the transition that already committed.
    async fn notify(&self, recipient: Party, kind: NotificationKind, body: String, showing_id: i64) {
        let notification = Notification {
            id: self.id_generator.generate(),
            recipient,
            kind,
            body,
            reference_id: Some(showing_id),
            read: false,
            created_at: Utc::now(),
        };

        if let Err(e) = self.notification_repo.create(&notification).await {
            tracing::warn!(
                showing_id,
                error = %e,
                "Failed to create showing notification"
            );
        }
    }

    fn actor_is_agent(actor: Party, showing: &ShowingSchedule) -> bool {
        actor.role == Role::Agent && actor.id == showing.agent_id
    }

    fn actor_is_buyer(actor: Party, showing: &ShowingSchedule) -> bool {
        actor.role == Role::Buyer && actor.id == showing.buyer_id
    }
}

#[async_trait]
impl<Sh, L, N> ShowingService for ShowingServiceImpl<Sh, L, N>
where
    Sh: ShowingRepository + 'static,
    L: ListingRepository + 'static,
    N: NotificationRepository + 'static,
{
    async fn request_showing(
        &self,
        actor: Party,
        request: RequestShowingDto,
    ) -> Result<ShowingSchedule, ShowingError> {
        if actor.role != Role::Buyer {
            return Err(ShowingError::Forbidden);
        }

        if request.scheduled_end <= request.scheduled_start
            || request.scheduled_start <= Utc::now()
        {
            return Err(ShowingError::InvalidWindow);
        }

        let listing = self
            .listing_repo
            .find_by_id(request.listing_id)
            .await
            .map_err(|e| ShowingError::Internal(e.to_string()))?
            .ok_or(ShowingError::ListingNotFound)?;

        if !listing.status.is_open() {
            return Err(ShowingError::ListingClosed);
        }

        let now = Utc::now();
        let showing = ShowingSchedule {
            id: self.id_generator.generate(),
            listing_id: listing.id,
            agent_id: listing.agent_id,
            buyer_id: actor.id,
            status: ShowingStatus::Pending,
            scheduled_start: request.scheduled_start,
            scheduled_end: request.scheduled_end,
            note: request.note,
            decline_reason: None,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .showing_repo
            .create(&showing)
            .await
            .map_err(|e| ShowingError::Internal(e.to_string()))?;

        self.notify(
            Party::new(Role::Agent, listing.agent_id),
            NotificationKind::ShowingRequested,
            format!("New showing request for \"{}\"", listing.title),
            created.id,
        )
        .await;

        Ok(created)
    }

    async fn get_showing(&self, actor: Party, id: i64) -> Result<ShowingSchedule, ShowingError> {
        let showing = self.find_showing(id).await?;

        if !Self::actor_is_agent(actor, &showing) && !Self::actor_is_buyer(actor, &showing) {
            return Err(ShowingError::Forbidden);
        }

        Ok(showing)
    }

    async fn list_showings(&self, actor: Party) -> Result<Vec<ShowingSchedule>, ShowingError> {
        let result = match actor.role {
            Role::Agent => self.showing_repo.find_by_agent(actor.id).await,
            Role::Buyer => self.showing_repo.find_by_buyer(actor.id).await,
            // Sellers are not showing participants
            Role::Seller => return Ok(Vec::new()),
        };

        result.map_err(|e| ShowingError::Internal(e.to_string()))
    }

    async fn listing_showings(
        &self,
        actor: Party,
        listing_id: i64,
    ) -> Result<Vec<ShowingSchedule>, ShowingError> {
        let listing = self
            .listing_repo
            .find_by_id(listing_id)
            .await
            .map_err(|e| ShowingError::Internal(e.to_string()))?
            .ok_or(ShowingError::ListingNotFound)?;

        if actor.role != Role::Agent || !listing.is_owned_by(actor.id) {
            return Err(ShowingError::Forbidden);
        }

        self.showing_repo
            .find_by_listing(listing_id)
            .await
            .map_err(|e| ShowingError::Internal(e.to_string()))
    }

    async fn accept_showing(&self, actor: Party, id: i64) -> Result<ShowingSchedule, ShowingError> {
        let showing = self.find_showing(id).await?;

        if !Self::actor_is_agent(actor, &showing) {
            return Err(ShowingError::Forbidden);
        }

        let updated = self.transition(&showing, ShowingStatus::Accepted, None).await?;

        self.notify(
            Party::new(Role::Buyer, showing.buyer_id),
            NotificationKind::ShowingAccepted,
            "Your showing request was accepted".to_string(),
            id,
        )
        .await;

        Ok(updated)
    }

    async fn decline_showing(
        &self,
        actor: Party,
        id: i64,
        reason: Option<String>,
    ) -> Result<ShowingSchedule, ShowingError> {
        let showing = self.find_showing(id).await?;

        if !Self::actor_is_agent(actor, &showing) {
            return Err(ShowingError::Forbidden);
        }

        let updated = self
            .transition(&showing, ShowingStatus::Declined, reason.as_deref())
            .await?;

        self.notify(
            Party::new(Role::Buyer, showing.buyer_id),
            NotificationKind::ShowingDeclined,
            "Your showing request was declined".to_string(),
            id,
        )
        .await;

        Ok(updated)
    }

    async fn cancel_showing(&self, actor: Party, id: i64) -> Result<ShowingSchedule, ShowingError> {
        let showing = self.find_showing(id).await?;

        let is_agent = Self::actor_is_agent(actor, &showing);
        let is_buyer = Self::actor_is_buyer(actor, &showing);
        if !is_agent && !is_buyer {
            return Err(ShowingError::Forbidden);
        }

        let updated = self.transition(&showing, ShowingStatus::Cancelled, None).await?;

        // Tell the other side
        let recipient = if is_agent {
            Party::new(Role::Buyer, showing.buyer_id)
        } else {
            Party::new(Role::Agent, showing.agent_id)
        };
        self.notify(
            recipient,
            NotificationKind::ShowingCancelled,
            "A scheduled showing was cancelled".to_string(),
            id,
        )
        .await;

        Ok(updated)
    }

    async fn complete_showing(
        &self,
        actor: Party,
        id: i64,
    ) -> Result<ShowingSchedule, ShowingError> {
        let showing = self.find_showing(id).await?;

        if !Self::actor_is_agent(actor, &showing) {
            return Err(ShowingError::Forbidden);
        }

        self.transition(&showing, ShowingStatus::Completed, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn showing(status: ShowingStatus) -> ShowingSchedule {
        let now = Utc::now();
        ShowingSchedule {
            id: 1,
            listing_id: 2,
            agent_id: 10,
            buyer_id: 20,
            status,
            scheduled_start: now,
            scheduled_end: now,
            note: None,
            decline_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_participant_checks() {
        let s = showing(ShowingStatus::Pending);

        type Svc = ShowingServiceImpl<
            crate::infrastructure::repositories::PgShowingRepository,
            crate::infrastructure::repositories::PgListingRepository,
            crate::infrastructure::repositories::PgNotificationRepository,
        >;

        assert!(Svc::actor_is_agent(Party::new(Role::Agent, 10), &s));
        assert!(!Svc::actor_is_agent(Party::new(Role::Agent, 11), &s));
        // A buyer with the agent's ID is not the agent
        assert!(!Svc::actor_is_agent(Party::new(Role::Buyer, 10), &s));
        assert!(Svc::actor_is_buyer(Party::new(Role::Buyer, 20), &s));
        assert!(!Svc::actor_is_buyer(Party::new(Role::Seller, 20), &s));
    }
}
