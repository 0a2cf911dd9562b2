//! Privacy Repository Implementation
//!
//! PostgreSQL implementation of privacy settings and legal documents.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{LegalDocument, Party, PrivacyRepository, PrivacySettings, Role};
use crate::shared::error::AppError;

/// PostgreSQL privacy repository implementation.
pub struct PgPrivacyRepository {
    pool: PgPool,
}

impl PgPrivacyRepository {
    /// Creates a new PgPrivacyRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for privacy settings queries.
#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    account_role: String,
    account_id: i64,
    show_email: bool,
    show_phone: bool,
    marketing_emails: bool,
    updated_at: DateTime<Utc>,
}

impl SettingsRow {
    fn into_settings(self) -> PrivacySettings {
        PrivacySettings {
            account: Party::new(
                Role::from_str(&self.account_role).unwrap_or(Role::Buyer),
                self.account_id,
            ),
            show_email: self.show_email,
            show_phone: self.show_phone,
            marketing_emails: self.marketing_emails,
            updated_at: self.updated_at,
        }
    }
}

/// Internal row type for legal document queries.
#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    slug: String,
    title: String,
    body: String,
    version: i32,
    published_at: DateTime<Utc>,
}

impl DocumentRow {
    fn into_document(self) -> LegalDocument {
        LegalDocument {
            slug: self.slug,
            title: self.title,
            body: self.body,
            version: self.version,
            published_at: self.published_at,
        }
    }
}

#[async_trait]
impl PrivacyRepository for PgPrivacyRepository {
    async fn find_settings(&self, account: Party) -> Result<Option<PrivacySettings>, AppError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT account_role, account_id, show_email, show_phone, marketing_emails, updated_at
            FROM privacy_settings
            WHERE account_role = $1 AND account_id = $2
            "#,
        )
        .bind(account.role.as_str())
        .bind(account.id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_settings()))
    }

    async fn upsert_settings(
        &self,
        settings: &PrivacySettings,
    ) -> Result<PrivacySettings, AppError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            INSERT INTO privacy_settings (account_role, account_id, show_email, show_phone, marketing_emails)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (account_role, account_id)
            DO UPDATE SET show_email = $3, show_phone = $4, marketing_emails = $5, updated_at = NOW()
            RETURNING account_role, account_id, show_email, show_phone, marketing_emails, updated_at
            "#,
        )
        .bind(settings.account.role.as_str())
        .bind(settings.account.id)
        .bind(settings.show_email)
        .bind(settings.show_phone)
        .bind(settings.marketing_emails)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_settings())
    }

    async fn find_document(&self, slug: &str) -> Result<Option<LegalDocument>, AppError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT slug, title, body, version, published_at
            FROM legal_documents
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_document()))
    }
}
