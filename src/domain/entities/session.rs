//! Session entity and repository trait.
//!
//! Maps to the `sessions` table. Sessions hold hashed refresh tokens so
//! access tokens can be renewed and revoked per device.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Party, Role};
use crate::shared::error::AppError;

/// Represents a refresh-token session for an account.
///
/// Maps to the `sessions` table:
/// - id: UUID PRIMARY KEY
/// - account_role: VARCHAR(10) NOT NULL
/// - account_id: BIGINT NOT NULL
/// - refresh_token_hash: VARCHAR(64) NOT NULL UNIQUE -- SHA-256 hex
/// - expires_at: TIMESTAMPTZ NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: uuid::Uuid,

    /// Role of the owning account
    pub account_role: Role,

    /// ID of the owning account
    pub account_id: i64,

    /// SHA-256 hex digest of the opaque refresh token
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,

    /// Expiration timestamp
    pub expires_at: DateTime<Utc>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// The owning account as a party reference.
    pub fn account(&self) -> Party {
        Party::new(self.account_role, self.account_id)
    }

    /// Whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Repository trait for Session data access operations.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Find a session by its refresh token hash.
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError>;

    /// Create a new session.
    async fn create(&self, session: &Session) -> Result<Session, AppError>;

    /// Delete a session by token hash (logout).
    async fn delete_by_token_hash(&self, token_hash: &str) -> Result<(), AppError>;

    /// Delete all of an account's sessions (password reset).
    async fn delete_for_account(&self, account: Party) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_expired() {
        let mut session = Session {
            id: uuid::Uuid::new_v4(),
            account_role: Role::Agent,
            account_id: 1,
            refresh_token_hash: "abc".into(),
            expires_at: Utc::now() + Duration::days(1),
            created_at: Utc::now(),
        };
        assert!(!session.is_expired());

        session.expires_at = Utc::now() - Duration::seconds(1);
        assert!(session.is_expired());
    }

    #[test]
    fn test_token_hash_not_serialized() {
        let session = Session {
            id: uuid::Uuid::new_v4(),
            account_role: Role::Buyer,
            account_id: 9,
            refresh_token_hash: "deadbeef".into(),
            expires_at: Utc::now(),
            created_at: Utc::now(),
        };
        let serialized = serde_json::to_string(&session).unwrap();
        assert!(!serialized.contains("deadbeef"));
    }
}
