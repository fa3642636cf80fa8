use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Booking,
    Message,
    Review,
    System,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Booking => "booking",
            NotificationType::Message => "message",
            NotificationType::Review => "review",
            NotificationType::System => "system",
        }
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booking" => Ok(NotificationType::Booking),
            "message" => Ok(NotificationType::Message),
            "review" => Ok(NotificationType::Review),
            "system" => Ok(NotificationType::System),
            _ => Err(format!("Unknown notification type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub recipient_user_id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub link: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_user_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub link: String,
}

impl NewNotification {
    pub fn new(
        recipient_user_id: Uuid,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            recipient_user_id,
            notification_type,
            title: title.into(),
            message: message.into(),
            link: link.into(),
        }
    }
}
