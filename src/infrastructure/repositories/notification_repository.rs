//! Notification Repository Implementation
//!
//! PostgreSQL implementation of notification records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Notification, NotificationKind, NotificationRepository, Party, Role};
use crate::shared::error::AppError;

/// PostgreSQL notification repository implementation.
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    /// Creates a new PgNotificationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for notification queries.
#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    recipient_role: String,
    recipient_id: i64,
    kind: String,
    body: String,
    reference_id: Option<i64>,
    read: bool,
    created_at: DateTime<Utc>,
}

impl NotificationRow {
    /// Converts database row to domain Notification entity.
    fn into_notification(self) -> Notification {
        Notification {
            id: self.id,
            recipient: Party::new(
                Role::from_str(&self.recipient_role).unwrap_or(Role::Buyer),
                self.recipient_id,
            ),
            kind: NotificationKind::from_str(&self.kind)
                .unwrap_or(NotificationKind::NewMessage),
            body: self.body,
            reference_id: self.reference_id,
            read: self.read,
            created_at: self.created_at,
        }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn find_for_recipient(
        &self,
        recipient: Party,
        limit: i32,
    ) -> Result<Vec<Notification>, AppError> {
        let limit = limit.clamp(1, 100);

        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, recipient_role, recipient_id, kind, body, reference_id, read, created_at
            FROM notifications
            WHERE recipient_role = $1 AND recipient_id = $2
            ORDER BY id DESC
            LIMIT $3
            "#,
        )
        .bind(recipient.role.as_str())
        .bind(recipient.id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_notification()).collect())
    }

    async fn count_unread(&self, recipient: Party) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM notifications
            WHERE recipient_role = $1 AND recipient_id = $2 AND read = FALSE
            "#,
        )
        .bind(recipient.role.as_str())
        .bind(recipient.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Create a notification.
    ///
    /// The ID should be a pre-generated Snowflake ID from the application layer.
    async fn create(&self, notification: &Notification) -> Result<Notification, AppError> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (id, recipient_role, recipient_id, kind, body, reference_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, recipient_role, recipient_id, kind, body, reference_id, read, created_at
            "#,
        )
        .bind(notification.id)
        .bind(notification.recipient.role.as_str())
        .bind(notification.recipient.id)
        .bind(notification.kind.as_str())
        .bind(&notification.body)
        .bind(notification.reference_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_notification())
    }

    /// Mark one notification read.
    ///
    /// The recipient is part of the WHERE clause so an account cannot mark
    /// someone else's notification.
    async fn mark_read(&self, id: i64, recipient: Party) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE notifications SET read = TRUE
            WHERE id = $1 AND recipient_role = $2 AND recipient_id = $3
            "#,
        )
        .bind(id)
        .bind(recipient.role.as_str())
        .bind(recipient.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Notification {} not found", id)));
        }

        Ok(())
    }

    async fn mark_all_read(&self, recipient: Party) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE notifications SET read = TRUE
            WHERE recipient_role = $1 AND recipient_id = $2 AND read = FALSE
            "#,
        )
        .bind(recipient.role.as_str())
        .bind(recipient.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
