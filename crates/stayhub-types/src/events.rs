// ============================================================================
// Realtime Protocol - Adjacently Tagged JSON Events
// ============================================================================
//
// Every frame is `{"event": "<name>", "data": {...}}`. Event names are
// snake_case, payload fields camelCase.
//
// ============================================================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directory::UserProfile;
use crate::message::{ConversationKey, Message};
use crate::notification::Notification;

// ============================================================================
// Client Event Data Structures
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyData {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomData {
    pub listing_id: Uuid,
    pub guest_id: Uuid,
}

impl RoomData {
    pub fn key(&self) -> ConversationKey {
        ConversationKey::new(self.listing_id, self.guest_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageData {
    pub sender_id: Uuid,
    pub listing_id: Uuid,
    pub guest_id: Uuid,
    pub content: String,
}

impl SendMessageData {
    pub fn key(&self) -> ConversationKey {
        ConversationKey::new(self.listing_id, self.guest_id)
    }
}

/// Typing indicator, relayed verbatim to the conversation room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingData {
    pub listing_id: Uuid,
    pub guest_id: Uuid,
    pub sender_id: Uuid,
}

impl TypingData {
    pub fn key(&self) -> ConversationKey {
        ConversationKey::new(self.listing_id, self.guest_id)
    }
}

// ============================================================================
// ClientEvent Enum
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum ClientEvent {
    Identify(IdentifyData),
    JoinRoom(RoomData),
    LeaveRoom(RoomData),
    SendMessage(SendMessageData),
    Typing(TypingData),
    StopTyping(TypingData),
}

// ============================================================================
// Server Event Data Structures
// ============================================================================

/// A freshly stored message plus the sender's public identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredMessage {
    #[serde(flatten)]
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sender: Option<UserProfile>,
}

/// Confirms a room membership so the client knows when pushes start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedData {
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    pub code: String,
    pub message: String,
}

// ============================================================================
// ServerEvent Enum
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum ServerEvent {
    Joined(JoinedData),
    MessageReceived(DeliveredMessage),
    /// Out-of-band ping to the recipient's private room: refresh the inbox
    Alert(Message),
    Typing(TypingData),
    StopTyping(TypingData),
    /// Notification feed changed
    Notification(Notification),
    Error(ErrorData),
}

impl ServerEvent {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        ServerEvent::Error(ErrorData {
            code: code.into(),
            message: message.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_event_adjacently_tagged_format() {
        let user_id = Uuid::new_v4();
        let raw = json!({"event": "identify", "data": {"userId": user_id}});
        match serde_json::from_value::<ClientEvent>(raw).unwrap() {
            ClientEvent::Identify(data) => assert_eq!(data.user_id, user_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_client_event_snake_case_names() {
        let raw = json!({
            "event": "stop_typing",
            "data": {
                "listingId": Uuid::new_v4(),
                "guestId": Uuid::new_v4(),
                "senderId": Uuid::new_v4()
            }
        });
        assert!(matches!(
            serde_json::from_value::<ClientEvent>(raw).unwrap(),
            ClientEvent::StopTyping(_)
        ));
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let raw = json!({"event": "delete_everything", "data": {}});
        assert!(serde_json::from_value::<ClientEvent>(raw).is_err());
    }

    #[test]
    fn test_delivered_message_flattens_message_fields() {
        let message = Message {
            id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            guest_id: Uuid::new_v4(),
            content: "Hi".to_string(),
            timestamp: chrono::Utc::now(),
            is_read: false,
        };
        let event = ServerEvent::MessageReceived(DeliveredMessage {
            message: message.clone(),
            sender: Some(UserProfile {
                id: message.sender_id,
                name: "Ana".to_string(),
                email: Some("ana@example.com".to_string()),
                avatar: None,
            }),
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "message_received");
        assert_eq!(value["data"]["content"], "Hi");
        assert_eq!(value["data"]["sender"]["name"], "Ana");
        // Email never leaves the server
        assert!(value["data"]["sender"].get("email").is_none());
    }
}
