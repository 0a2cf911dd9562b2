//! Privacy Service
//!
//! Per-account privacy settings (read-or-default, upsert on write) and
//! versioned legal documents read by slug.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{LegalDocument, Party, PrivacyRepository, PrivacySettings};

/// Privacy service trait
#[async_trait]
pub trait PrivacyService: Send + Sync {
    /// The actor's settings, or defaults when none were ever saved
    async fn get_settings(&self, actor: Party) -> Result<PrivacySettings, PrivacyError>;

    /// Update the actor's settings; `None` leaves a field unchanged
    async fn update_settings(
        &self,
        actor: Party,
        update: UpdatePrivacyDto,
    ) -> Result<PrivacySettings, PrivacyError>;

    /// Fetch a legal document by slug
    async fn get_document(&self, slug: &str) -> Result<LegalDocument, PrivacyError>;
}

/// Settings update; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct UpdatePrivacyDto {
    pub show_email: Option<bool>,
    pub show_phone: Option<bool>,
    pub marketing_emails: Option<bool>,
}

/// Privacy service errors
#[derive(Debug, thiserror::Error)]
pub enum PrivacyError {
    #[error("Document not found")]
    DocumentNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// PrivacyService implementation
pub struct PrivacyServiceImpl<P>
where
    P: PrivacyRepository,
{
    privacy_repo: Arc<P>,
}

impl<P> PrivacyServiceImpl<P>
where
    P: PrivacyRepository,
{
    pub fn new(privacy_repo: Arc<P>) -> Self {
        Self { privacy_repo }
    }
}

#[async_trait]
impl<P> PrivacyService for PrivacyServiceImpl<P>
where
    P: PrivacyRepository + 'static,
{
    async fn get_settings(&self, actor: Party) -> Result<PrivacySettings, PrivacyError> {
        let settings = self
            .privacy_repo
            .find_settings(actor)
            .await
            .map_err(|e| PrivacyError::Internal(e.to_string()))?;

        Ok(settings.unwrap_or_else(|| PrivacySettings::defaults_for(actor)))
    }

    async fn update_settings(
        &self,
        actor: Party,
        update: UpdatePrivacyDto,
    ) -> Result<PrivacySettings, PrivacyError> {
        // Merge over the current (or default) values so partial updates work
        let mut settings = self.get_settings(actor).await?;

        if let Some(show_email) = update.show_email {
            settings.show_email = show_email;
        }
        if let Some(show_phone) = update.show_phone {
            settings.show_phone = show_phone;
        }
        if let Some(marketing_emails) = update.marketing_emails {
            settings.marketing_emails = marketing_emails;
        }
        settings.updated_at = Utc::now();

        self.privacy_repo
            .upsert_settings(&settings)
            .await
            .map_err(|e| PrivacyError::Internal(e.to_string()))
    }

    async fn get_document(&self, slug: &str) -> Result<LegalDocument, PrivacyError> {
        self.privacy_repo
            .find_document(slug)
            .await
            .map_err(|e| PrivacyError::Internal(e.to_string()))?
            .ok_or(PrivacyError::DocumentNotFound)
    }
}
