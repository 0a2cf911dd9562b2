//! Privacy settings and legal documents.
//!
//! Maps to the `privacy_settings` and `legal_documents` tables. Privacy
//! settings reads fall back to defaults when no row exists; writes upsert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Party;
use crate::shared::error::AppError;

/// Per-account privacy preferences.
///
/// Maps to the `privacy_settings` table:
/// - account_role: VARCHAR(10) NOT NULL
/// - account_id: BIGINT NOT NULL
/// - show_email: BOOLEAN NOT NULL DEFAULT FALSE
/// - show_phone: BOOLEAN NOT NULL DEFAULT FALSE
/// - marketing_emails: BOOLEAN NOT NULL DEFAULT TRUE
/// - updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - PRIMARY KEY (account_role, account_id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivacySettings {
    /// Account these settings belong to
    pub account: Party,

    /// Expose the email address on the public profile
    pub show_email: bool,

    /// Expose the phone number on the public profile
    pub show_phone: bool,

    /// Opt in to marketing email
    pub marketing_emails: bool,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl PrivacySettings {
    /// Defaults used when an account has never saved settings.
    pub fn defaults_for(account: Party) -> Self {
        Self {
            account,
            show_email: false,
            show_phone: false,
            marketing_emails: true,
            updated_at: Utc::now(),
        }
    }
}

/// A versioned legal document (terms of service, privacy policy).
///
/// Maps to the `legal_documents` table:
/// - slug: VARCHAR(64) PRIMARY KEY  -- e.g. "terms-of-service"
/// - title: VARCHAR(200) NOT NULL
/// - body: TEXT NOT NULL
/// - version: INT NOT NULL
/// - published_at: TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalDocument {
    pub slug: String,
    pub title: String,
    pub body: String,
    pub version: i32,
    pub published_at: DateTime<Utc>,
}

/// Repository trait for privacy settings and legal documents.
#[async_trait]
pub trait PrivacyRepository: Send + Sync {
    /// Fetch an account's settings row, if it has one.
    async fn find_settings(&self, account: Party) -> Result<Option<PrivacySettings>, AppError>;

    /// Insert or update an account's settings.
    async fn upsert_settings(&self, settings: &PrivacySettings)
        -> Result<PrivacySettings, AppError>;

    /// Fetch a legal document by slug.
    async fn find_document(&self, slug: &str) -> Result<Option<LegalDocument>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Role;

    #[test]
    fn test_defaults_hide_contact_details() {
        let defaults = PrivacySettings::defaults_for(Party::new(Role::Seller, 5));
        assert!(!defaults.show_email);
        assert!(!defaults.show_phone);
        assert!(defaults.marketing_emails);
    }
}
