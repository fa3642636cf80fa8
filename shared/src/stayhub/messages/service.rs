// ============================================================================
// ChatService - the send pipeline shared by the realtime and REST paths
// ============================================================================
//
// send = validate -> lock conversation -> persist -> broadcast to the
// conversation room -> alert the recipient's private room -> unlock.
// Holding the per-conversation lock across persist and broadcast keeps the
// push order identical to the stored order.
//
// ============================================================================

use std::sync::Arc;

use stayhub_config::{LoggingConfig, MAX_MESSAGE_CONTENT_CHARS};
use stayhub_error::{AppError, AppResult};
use stayhub_metrics::MESSAGES_SENT_TOTAL;
use stayhub_types::{
    ConversationKey, DeliveredMessage, ListingSummary, Message, NewNotification,
    NotificationType, ServerEvent, UserProfile, normalize_content,
};
use uuid::Uuid;

use super::MessageStore;
use crate::directory::Directory;
use crate::locks::KeyedLocks;
use crate::notifications::Notifier;
use crate::realtime::RealtimeHub;
use crate::utils::log_user;

/// Longest preview of a message quoted in a notification
const PREVIEW_CHARS: usize = 80;

pub struct ChatService {
    store: Arc<dyn MessageStore>,
    directory: Arc<dyn Directory>,
    hub: Arc<RealtimeHub>,
    notifier: Arc<Notifier>,
    conversation_locks: KeyedLocks<ConversationKey>,
    logging: LoggingConfig,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn MessageStore>,
        directory: Arc<dyn Directory>,
        hub: Arc<RealtimeHub>,
        notifier: Arc<Notifier>,
        logging: LoggingConfig,
    ) -> Self {
        Self {
            store,
            directory,
            hub,
            notifier,
            conversation_locks: KeyedLocks::new(),
            logging,
        }
    }

    /// Resolve the listing and check that `user_id` is the guest or the host
    /// of the conversation
    pub async fn ensure_participant(
        &self,
        key: ConversationKey,
        user_id: Uuid,
    ) -> AppResult<ListingSummary> {
        let listing = self
            .directory
            .listing(key.listing_id)
            .await?
            .ok_or_else(|| AppError::not_found("Listing not found"))?;

        if user_id != key.guest_id && !listing.is_owned_by(user_id) {
            return Err(AppError::unauthorized(
                "Only the guest and the host can access this conversation",
            ));
        }
        Ok(listing)
    }

    /// Persist a message and deliver it to everyone watching the conversation
    pub async fn send(
        &self,
        sender_id: Uuid,
        key: ConversationKey,
        content: &str,
    ) -> AppResult<DeliveredMessage> {
        let content =
            normalize_content(content, MAX_MESSAGE_CONTENT_CHARS).map_err(AppError::Validation)?;
        let listing = self.ensure_participant(key, sender_id).await?;
        let recipient_id = if sender_id == key.guest_id {
            listing.owner_id
        } else {
            key.guest_id
        };

        let guard = self.conversation_locks.lock(&key).await;

        let first_in_thread = self.store.thread_len(key).await? == 0;
        // Replying implies the sender has read the thread
        self.store.mark_read(key, sender_id).await?;
        let message = self.store.save(sender_id, key, content).await?;
        MESSAGES_SENT_TOTAL.inc();

        let delivered = DeliveredMessage {
            sender: self.sender_profile(sender_id).await,
            message,
        };

        let in_room = self
            .hub
            .broadcast(
                &key.room_name(),
                &ServerEvent::MessageReceived(delivered.clone()),
            )
            .await;
        if recipient_id != sender_id {
            self.hub
                .send_to_user(recipient_id, &ServerEvent::Alert(delivered.message.clone()))
                .await;
        }

        drop(guard);

        tracing::debug!(
            listing_id = %key.listing_id,
            sender = %log_user(sender_id, &self.logging),
            in_room,
            "Message sent"
        );

        if first_in_thread && recipient_id != sender_id {
            self.notifier
                .notify(first_message_notification(
                    recipient_id,
                    &listing,
                    delivered.sender.as_ref(),
                    &delivered.message,
                ))
                .await;
        }

        Ok(delivered)
    }

    /// Conversation history for a participant, oldest first
    pub async fn history(&self, key: ConversationKey, user_id: Uuid) -> AppResult<Vec<Message>> {
        self.ensure_participant(key, user_id).await?;
        self.store.history(key).await
    }

    /// Mark the counterparty's messages as read for a participant
    pub async fn mark_read(&self, key: ConversationKey, user_id: Uuid) -> AppResult<u64> {
        self.ensure_participant(key, user_id).await?;
        self.store.mark_read(key, user_id).await
    }

    /// Profile lookup failures never fail a send that is already stored
    async fn sender_profile(&self, sender_id: Uuid) -> Option<UserProfile> {
        match self.directory.user(sender_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    sender = %log_user(sender_id, &self.logging),
                    "Failed to resolve sender profile"
                );
                None
            }
        }
    }
}

fn first_message_notification(
    recipient_id: Uuid,
    listing: &ListingSummary,
    sender: Option<&UserProfile>,
    message: &Message,
) -> NewNotification {
    let from = sender.map(|s| s.name.as_str()).unwrap_or("A guest");
    let preview: String = message.content.chars().take(PREVIEW_CHARS).collect();
    NewNotification::new(
        recipient_id,
        NotificationType::Message,
        format!("New message about {}", listing.title),
        format!("{}: {}", from, preview),
        format!("/messages/{}/{}", message.listing_id, message.guest_id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use crate::messages::{InMemoryMessageStore, InboxAggregator};
    use crate::notifications::InMemoryNotificationStore;
    use stayhub_config::NotificationConfig;
    use tokio::sync::mpsc;

    struct Fixture {
        chat: ChatService,
        inbox: InboxAggregator,
        notifier: Arc<Notifier>,
        hub: Arc<RealtimeHub>,
        host: Uuid,
        key: ConversationKey,
    }

    async fn fixture() -> Fixture {
        let directory = Arc::new(InMemoryDirectory::new());
        let store = Arc::new(InMemoryMessageStore::new());
        let hub = Arc::new(RealtimeHub::new());
        let notifier = Arc::new(Notifier::new(
            Arc::new(InMemoryNotificationStore::new()),
            hub.clone(),
            NotificationConfig::default(),
            LoggingConfig::default(),
        ));

        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let listing = Uuid::new_v4();
        for (id, name) in [(host, "Hana"), (guest, "Gil")] {
            directory
                .insert_user(UserProfile {
                    id,
                    name: name.to_string(),
                    email: None,
                    avatar: None,
                })
                .await;
        }
        directory
            .insert_listing(ListingSummary {
                id: listing,
                owner_id: host,
                title: "Cliff cottage".to_string(),
                images: vec![],
            })
            .await;

        Fixture {
            chat: ChatService::new(
                store.clone(),
                directory.clone(),
                hub.clone(),
                notifier.clone(),
                LoggingConfig::default(),
            ),
            inbox: InboxAggregator::new(store, directory, LoggingConfig::default()),
            notifier,
            hub,
            host,
            key: ConversationKey::new(listing, guest),
        }
    }

    #[tokio::test]
    async fn test_hi_hello_scenario() {
        let f = fixture().await;

        f.chat.send(f.key.guest_id, f.key, "Hi").await.unwrap();
        f.chat.send(f.host, f.key, "Hello").await.unwrap();

        let host_view = f.inbox.inbox(f.host).await.unwrap();
        assert_eq!(host_view.len(), 1);
        assert_eq!(host_view[0].last_message.content, "Hello");
        assert_eq!(host_view[0].unread_count, 0);

        let guest_view = f.inbox.inbox(f.key.guest_id).await.unwrap();
        assert_eq!(guest_view[0].unread_count, 1);

        f.chat.mark_read(f.key, f.key.guest_id).await.unwrap();
        let guest_view = f.inbox.inbox(f.key.guest_id).await.unwrap();
        assert_eq!(guest_view[0].unread_count, 0);
    }

    #[tokio::test]
    async fn test_send_broadcasts_and_alerts_the_other_party() {
        let f = fixture().await;
        let (room_tx, mut room_rx) = mpsc::channel(16);
        let (host_tx, mut host_rx) = mpsc::channel(16);
        let (guest_tx, mut guest_rx) = mpsc::channel(16);
        f.hub
            .join(f.hub.next_connection_id(), &f.key.room_name(), room_tx)
            .await;
        f.hub
            .join(f.hub.next_connection_id(), &f.host.to_string(), host_tx)
            .await;
        f.hub
            .join(f.hub.next_connection_id(), &f.key.guest_id.to_string(), guest_tx)
            .await;

        let delivered = f.chat.send(f.key.guest_id, f.key, "  Hi  ").await.unwrap();
        assert_eq!(delivered.message.content, "Hi");
        assert_eq!(delivered.sender.as_ref().unwrap().name, "Gil");

        match room_rx.try_recv().unwrap() {
            ServerEvent::MessageReceived(m) => assert_eq!(m.message.id, delivered.message.id),
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(host_rx.try_recv().unwrap(), ServerEvent::Alert(_)));
        // First message in the thread also lands in the host's feed
        assert!(matches!(
            host_rx.try_recv().unwrap(),
            ServerEvent::Notification(_)
        ));
        assert!(guest_rx.try_recv().is_err(), "sender gets no alert");
    }

    #[tokio::test]
    async fn test_only_first_message_creates_a_notification() {
        let f = fixture().await;
        f.chat.send(f.key.guest_id, f.key, "one").await.unwrap();
        f.chat.send(f.key.guest_id, f.key, "two").await.unwrap();
        f.chat.send(f.host, f.key, "three").await.unwrap();

        let feed = f.notifier.list_recent(f.host, None).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].notification_type, NotificationType::Message);
        assert!(f
            .notifier
            .list_recent(f.key.guest_id, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_send_rejects_blank_and_outsiders() {
        let f = fixture().await;
        assert!(matches!(
            f.chat.send(f.key.guest_id, f.key, " \n ").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            f.chat.send(Uuid::new_v4(), f.key, "let me in").await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            f.chat.history(f.key, Uuid::new_v4()).await,
            Err(AppError::Unauthorized(_))
        ));
        let unknown = ConversationKey::new(Uuid::new_v4(), f.key.guest_id);
        assert!(matches!(
            f.chat.send(f.key.guest_id, unknown, "hello?").await,
            Err(AppError::NotFound(_))
        ));
        assert!(f.chat.history(f.key, f.host).await.unwrap().is_empty());
    }
}
