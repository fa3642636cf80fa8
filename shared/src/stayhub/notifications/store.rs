use chrono::{DateTime, Utc};
use stayhub_db::DbPool;
use stayhub_error::{AppError, AppResult};
use stayhub_types::{NewNotification, Notification};
use uuid::Uuid;

/// Storage interface for the notification feed
#[async_trait::async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, notification: NewNotification) -> AppResult<Notification>;

    /// Newest first, at most `limit` entries
    async fn list_recent(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<Notification>>;

    /// Mark every unread notification of the user as read.
    /// Returns the number of rows that changed.
    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64>;
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    recipient_user_id: Uuid,
    #[sqlx(rename = "type")]
    notification_type: String,
    title: String,
    message: String,
    link: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = AppError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: row.id,
            recipient_user_id: row.recipient_user_id,
            notification_type: row.notification_type.parse().map_err(AppError::Internal)?,
            title: row.title,
            message: row.message,
            link: row.link,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

/// PostgreSQL implementation of NotificationStore
pub struct PostgresNotificationStore {
    pool: DbPool,
}

impl PostgresNotificationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl NotificationStore for PostgresNotificationStore {
    async fn insert(&self, notification: NewNotification) -> AppResult<Notification> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (id, recipient_user_id, type, title, message, link)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, recipient_user_id, type, title, message, link, is_read, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(notification.recipient_user_id)
        .bind(notification.notification_type.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.link)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn list_recent(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, recipient_user_id, type, title, message, link, is_read, created_at
            FROM notifications
            WHERE recipient_user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE recipient_user_id = $1 AND is_read = FALSE
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
