use chrono::Utc;
use stayhub_error::AppResult;
use stayhub_types::{NewNotification, Notification};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::NotificationStore;

/// Feed kept in insertion order; newest is last
#[derive(Default)]
pub struct InMemoryNotificationStore {
    notifications: RwLock<Vec<Notification>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert(&self, notification: NewNotification) -> AppResult<Notification> {
        let stored = Notification {
            id: Uuid::new_v4(),
            recipient_user_id: notification.recipient_user_id,
            notification_type: notification.notification_type,
            title: notification.title,
            message: notification.message,
            link: notification.link,
            is_read: false,
            created_at: Utc::now(),
        };
        self.notifications.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list_recent(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<Notification>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .notifications
            .read()
            .await
            .iter()
            .rev()
            .filter(|n| n.recipient_user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let mut changed = 0;
        for n in self.notifications.write().await.iter_mut() {
            if n.recipient_user_id == user_id && !n.is_read {
                n.is_read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }
}
