use chrono::{DateTime, Duration, Utc};
use stayhub_error::AppResult;
use stayhub_types::{ConversationKey, Message};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::MessageStore;
use super::store::ensure_not_blank;

#[derive(Default)]
struct State {
    /// Insertion order, which is also timestamp order
    messages: Vec<Message>,
    last_timestamp: Option<DateTime<Utc>>,
}

/// Process-local message store.
///
/// Timestamps are strictly increasing so history order never depends on
/// clock resolution.
#[derive(Default)]
pub struct InMemoryMessageStore {
    state: RwLock<State>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn save(
        &self,
        sender_id: Uuid,
        key: ConversationKey,
        content: String,
    ) -> AppResult<Message> {
        ensure_not_blank(&content)?;

        let mut state = self.state.write().await;
        let mut timestamp = Utc::now();
        if let Some(last) = state.last_timestamp {
            if timestamp <= last {
                timestamp = last + Duration::microseconds(1);
            }
        }
        state.last_timestamp = Some(timestamp);

        let message = Message {
            id: Uuid::new_v4(),
            sender_id,
            listing_id: key.listing_id,
            guest_id: key.guest_id,
            content,
            timestamp,
            is_read: false,
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn history(&self, key: ConversationKey) -> AppResult<Vec<Message>> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .iter()
            .filter(|m| m.key() == key)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, key: ConversationKey, reader_id: Uuid) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let mut changed = 0;
        for m in state.messages.iter_mut() {
            if m.key() == key && !m.is_from(reader_id) && !m.is_read {
                m.is_read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn messages_involving(
        &self,
        user_id: Uuid,
        owned_listing_ids: &[Uuid],
    ) -> AppResult<Vec<Message>> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .iter()
            .rev()
            .filter(|m| {
                m.is_from(user_id)
                    || m.guest_id == user_id
                    || owned_listing_ids.contains(&m.listing_id)
            })
            .cloned()
            .collect())
    }

    async fn thread_len(&self, key: ConversationKey) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(state.messages.iter().filter(|m| m.key() == key).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stayhub_error::AppError;

    #[tokio::test]
    async fn test_save_rejects_blank_content() {
        let store = InMemoryMessageStore::new();
        let key = ConversationKey::new(Uuid::new_v4(), Uuid::new_v4());
        let result = store.save(key.guest_id, key, "   ".to_string()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.thread_len(key).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_history_is_ascending_and_isolated() {
        let store = InMemoryMessageStore::new();
        let listing = Uuid::new_v4();
        let a = ConversationKey::new(listing, Uuid::new_v4());
        let b = ConversationKey::new(listing, Uuid::new_v4());

        for i in 0..5 {
            store
                .save(a.guest_id, a, format!("a{}", i))
                .await
                .unwrap();
            store
                .save(b.guest_id, b, format!("b{}", i))
                .await
                .unwrap();
        }

        let history = store.history(a).await.unwrap();
        assert_eq!(history.len(), 5);
        assert!(history.iter().all(|m| m.key() == a));
        assert!(history.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(history[0].content, "a0");
    }

    #[tokio::test]
    async fn test_mark_read_skips_own_messages_and_is_idempotent() {
        let store = InMemoryMessageStore::new();
        let host = Uuid::new_v4();
        let key = ConversationKey::new(Uuid::new_v4(), Uuid::new_v4());

        store.save(key.guest_id, key, "Hi".to_string()).await.unwrap();
        store.save(key.guest_id, key, "Anyone?".to_string()).await.unwrap();
        store.save(host, key, "Hello".to_string()).await.unwrap();

        assert_eq!(store.mark_read(key, host).await.unwrap(), 2);
        assert_eq!(store.mark_read(key, host).await.unwrap(), 0);

        let history = store.history(key).await.unwrap();
        assert!(!history[2].is_read, "host's own message stays unread for the guest");
    }

    #[tokio::test]
    async fn test_messages_involving_covers_every_role() {
        let store = InMemoryMessageStore::new();
        let host = Uuid::new_v4();
        let owned = Uuid::new_v4();
        let elsewhere = Uuid::new_v4();

        let as_host = ConversationKey::new(owned, Uuid::new_v4());
        let as_guest = ConversationKey::new(elsewhere, host);
        let unrelated = ConversationKey::new(elsewhere, Uuid::new_v4());

        store.save(as_host.guest_id, as_host, "1".to_string()).await.unwrap();
        store.save(host, as_guest, "2".to_string()).await.unwrap();
        store.save(unrelated.guest_id, unrelated, "3".to_string()).await.unwrap();

        let involving = store.messages_involving(host, &[owned]).await.unwrap();
        let contents: Vec<_> = involving.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["2", "1"]);
    }
}
