// ============================================================================
// Inbox - threads derived from raw messages on every call
// ============================================================================
//
// A thread is identified by (listing_id, guest_id), never by listing alone:
// a host talking to several guests about one property has one thread per
// guest, and no guest ever sees another guest's messages.
//
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use stayhub_config::LoggingConfig;
use stayhub_error::AppResult;
use stayhub_types::{ConversationKey, ListingSummary, Message, Thread, UserProfile};
use uuid::Uuid;

use super::MessageStore;
use crate::directory::Directory;
use crate::utils::log_user;

/// Thread state computed from messages alone
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadSummary {
    pub key: ConversationKey,
    pub last_message: Message,
    /// Messages not authored by the viewer that are still unread
    pub unread_count: i64,
}

/// Group messages into per-conversation summaries as seen by `viewer_id`.
///
/// Messages are scanned newest first, so the first one seen for a key is its
/// last message. The result is ordered by last message timestamp, newest
/// first, ties broken by conversation key.
pub fn summarize_threads(viewer_id: Uuid, mut messages: Vec<Message>) -> Vec<ThreadSummary> {
    messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut index: HashMap<ConversationKey, usize> = HashMap::new();
    let mut summaries: Vec<ThreadSummary> = Vec::new();

    for message in messages {
        let unread = !message.is_from(viewer_id) && !message.is_read;
        let key = message.key();
        match index.get(&key) {
            Some(&i) => {
                if unread {
                    summaries[i].unread_count += 1;
                }
            }
            None => {
                index.insert(key, summaries.len());
                summaries.push(ThreadSummary {
                    key,
                    last_message: message,
                    unread_count: i64::from(unread),
                });
            }
        }
    }

    summaries.sort_by(|a, b| {
        b.last_message
            .timestamp
            .cmp(&a.last_message.timestamp)
            .then_with(|| a.key.cmp(&b.key))
    });
    summaries
}

/// Builds a user's inbox from the message store and the directory
pub struct InboxAggregator {
    store: Arc<dyn MessageStore>,
    directory: Arc<dyn Directory>,
    logging: LoggingConfig,
}

impl InboxAggregator {
    pub fn new(
        store: Arc<dyn MessageStore>,
        directory: Arc<dyn Directory>,
        logging: LoggingConfig,
    ) -> Self {
        Self {
            store,
            directory,
            logging,
        }
    }

    /// Every conversation the user takes part in, as guest or as host.
    ///
    /// Conversations whose listing or participants no longer resolve are
    /// left out.
    pub async fn inbox(&self, user_id: Uuid) -> AppResult<Vec<Thread>> {
        let owned: Vec<Uuid> = self
            .directory
            .listings_owned_by(user_id)
            .await?
            .into_iter()
            .map(|l| l.id)
            .collect();

        let messages = self.store.messages_involving(user_id, &owned).await?;
        let summaries = summarize_threads(user_id, messages);

        let mut lookup = Lookup::new(self.directory.as_ref());
        let mut threads = Vec::with_capacity(summaries.len());

        for summary in summaries {
            let key = summary.key;
            let Some(listing) = lookup.listing(key.listing_id).await? else {
                tracing::debug!(listing_id = %key.listing_id, "Skipping thread: listing not found");
                continue;
            };
            let Some(host) = lookup.user(listing.owner_id).await? else {
                tracing::debug!(listing_id = %key.listing_id, "Skipping thread: host not found");
                continue;
            };
            let Some(guest) = lookup.user(key.guest_id).await? else {
                tracing::debug!(
                    listing_id = %key.listing_id,
                    guest = %log_user(key.guest_id, &self.logging),
                    "Skipping thread: guest not found"
                );
                continue;
            };

            threads.push(Thread {
                listing_id: key.listing_id,
                guest_id: key.guest_id,
                listing,
                host,
                guest,
                last_message: summary.last_message,
                unread_count: summary.unread_count,
            });
        }

        Ok(threads)
    }
}

/// Directory lookups memoized for the duration of one inbox call
struct Lookup<'a> {
    directory: &'a dyn Directory,
    listings: HashMap<Uuid, Option<ListingSummary>>,
    users: HashMap<Uuid, Option<UserProfile>>,
}

impl<'a> Lookup<'a> {
    fn new(directory: &'a dyn Directory) -> Self {
        Self {
            directory,
            listings: HashMap::new(),
            users: HashMap::new(),
        }
    }

    async fn listing(&mut self, id: Uuid) -> AppResult<Option<ListingSummary>> {
        if let Some(cached) = self.listings.get(&id) {
            return Ok(cached.clone());
        }
        let found = self.directory.listing(id).await?;
        self.listings.insert(id, found.clone());
        Ok(found)
    }

    async fn user(&mut self, id: Uuid) -> AppResult<Option<UserProfile>> {
        if let Some(cached) = self.users.get(&id) {
            return Ok(cached.clone());
        }
        let found = self.directory.user(id).await?;
        self.users.insert(id, found.clone());
        Ok(found)
    }
}
