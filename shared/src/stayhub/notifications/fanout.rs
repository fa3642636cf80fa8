use std::sync::Arc;

use stayhub_config::{LoggingConfig, NotificationConfig};
use stayhub_error::AppResult;
use stayhub_metrics::NOTIFICATIONS_FAILED_TOTAL;
use stayhub_types::{NewNotification, Notification, ServerEvent};
use uuid::Uuid;

use super::NotificationStore;
use crate::realtime::RealtimeHub;
use crate::utils::log_user;

/// Creates notifications on behalf of the chat and booking flows.
///
/// `notify` never fails its caller: the action that caused a notification
/// (a booking, a message) has already happened and must not be reported as
/// failed because the feed could not be written.
pub struct Notifier {
    store: Arc<dyn NotificationStore>,
    hub: Arc<RealtimeHub>,
    config: NotificationConfig,
    logging: LoggingConfig,
}

impl Notifier {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        hub: Arc<RealtimeHub>,
        config: NotificationConfig,
        logging: LoggingConfig,
    ) -> Self {
        Self {
            store,
            hub,
            config,
            logging,
        }
    }

    /// Insert a notification and ping the recipient's private room.
    /// Returns `None` when the insert failed.
    pub async fn notify(&self, notification: NewNotification) -> Option<Notification> {
        let recipient = notification.recipient_user_id;
        let kind = notification.notification_type;

        match self.store.insert(notification).await {
            Ok(stored) => {
                let pushed = self
                    .hub
                    .send_to_user(recipient, &ServerEvent::Notification(stored.clone()))
                    .await;
                tracing::debug!(
                    recipient = %log_user(recipient, &self.logging),
                    kind = kind.as_str(),
                    pushed,
                    "Notification created"
                );
                Some(stored)
            }
            Err(e) => {
                NOTIFICATIONS_FAILED_TOTAL.inc();
                tracing::warn!(
                    error = %e,
                    recipient = %log_user(recipient, &self.logging),
                    kind = kind.as_str(),
                    "Failed to create notification"
                );
                None
            }
        }
    }

    pub async fn list_recent(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> AppResult<Vec<Notification>> {
        self.store
            .list_recent(user_id, self.config.clamp_limit(limit))
            .await
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        self.store.mark_all_read(user_id).await
    }
}
