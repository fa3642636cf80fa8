use chrono::{DateTime, Utc};
use stayhub_db::DbPool;
use stayhub_error::{AppError, AppResult};
use stayhub_types::{ConversationKey, Message};
use uuid::Uuid;

/// Storage interface for chat messages
///
/// Messages are append-only: only `is_read` ever changes after insert.
#[async_trait::async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a message. Blank content is rejected with `Validation`.
    async fn save(
        &self,
        sender_id: Uuid,
        key: ConversationKey,
        content: String,
    ) -> AppResult<Message>;

    /// Every message of one conversation, oldest first
    async fn history(&self, key: ConversationKey) -> AppResult<Vec<Message>>;

    /// Flip `is_read` on unread messages in the thread not sent by `reader_id`.
    /// Returns the number of messages that changed.
    async fn mark_read(&self, key: ConversationKey, reader_id: Uuid) -> AppResult<u64>;

    /// Every message where the user is the sender, the guest, or the host of
    /// one of `owned_listing_ids`. Newest first.
    async fn messages_involving(
        &self,
        user_id: Uuid,
        owned_listing_ids: &[Uuid],
    ) -> AppResult<Vec<Message>>;

    /// Number of messages stored for the conversation
    async fn thread_len(&self, key: ConversationKey) -> AppResult<i64>;
}

pub(crate) fn ensure_not_blank(content: &str) -> AppResult<()> {
    if content.trim().is_empty() {
        return Err(AppError::validation("Message content cannot be empty"));
    }
    Ok(())
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    sender_id: Uuid,
    listing_id: Uuid,
    guest_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    is_read: bool,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            sender_id: row.sender_id,
            listing_id: row.listing_id,
            guest_id: row.guest_id,
            content: row.content,
            timestamp: row.created_at,
            is_read: row.is_read,
        }
    }
}

/// PostgreSQL implementation of MessageStore
///
/// Rows sharing a `created_at` are ordered by the `seq` column, which follows
/// insertion order.
pub struct PostgresMessageStore {
    pool: DbPool,
}

impl PostgresMessageStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageStore for PostgresMessageStore {
    async fn save(
        &self,
        sender_id: Uuid,
        key: ConversationKey,
        content: String,
    ) -> AppResult<Message> {
        ensure_not_blank(&content)?;

        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (id, sender_id, listing_id, guest_id, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, sender_id, listing_id, guest_id, content, created_at, is_read
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(sender_id)
        .bind(key.listing_id)
        .bind(key.guest_id)
        .bind(&content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn history(&self, key: ConversationKey) -> AppResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender_id, listing_id, guest_id, content, created_at, is_read
            FROM messages
            WHERE listing_id = $1 AND guest_id = $2
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(key.listing_id)
        .bind(key.guest_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn mark_read(&self, key: ConversationKey, reader_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE
            WHERE listing_id = $1
              AND guest_id = $2
              AND sender_id <> $3
              AND is_read = FALSE
            "#,
        )
        .bind(key.listing_id)
        .bind(key.guest_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn messages_involving(
        &self,
        user_id: Uuid,
        owned_listing_ids: &[Uuid],
    ) -> AppResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender_id, listing_id, guest_id, content, created_at, is_read
            FROM messages
            WHERE sender_id = $1
               OR guest_id = $1
               OR listing_id = ANY($2)
            ORDER BY created_at DESC, seq DESC
            "#,
        )
        .bind(user_id)
        .bind(owned_listing_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn thread_len(&self, key: ConversationKey) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE listing_id = $1 AND guest_id = $2
            "#,
        )
        .bind(key.listing_id)
        .bind(key.guest_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
