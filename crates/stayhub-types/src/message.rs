use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directory::{ListingSummary, UserProfile};

// ============================================================================
// ConversationKey - identifies one guest/host thread about one listing
// ============================================================================

/// Composite key of a conversation.
///
/// A listing can have many concurrent guest conversations with the same
/// host, so the listing id alone never identifies a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationKey {
    pub listing_id: Uuid,
    pub guest_id: Uuid,
}

impl ConversationKey {
    pub fn new(listing_id: Uuid, guest_id: Uuid) -> Self {
        Self {
            listing_id,
            guest_id,
        }
    }

    /// Realtime room name for this conversation: `{listingId}-{guestId}`
    pub fn room_name(&self) -> String {
        format!("{}-{}", self.listing_id, self.guest_id)
    }
}

// ============================================================================
// Message
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub listing_id: Uuid,
    /// Always the guest party, also on messages the host sends
    pub guest_id: Uuid,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

impl Message {
    pub fn key(&self) -> ConversationKey {
        ConversationKey::new(self.listing_id, self.guest_id)
    }

    pub fn is_from(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id
    }
}

/// Validates and normalizes chat content.
///
/// # Returns
/// - `Ok(trimmed)` when the content has at least one non-whitespace character
///   and at most `max_chars` characters after trimming
/// - `Err(String)` with a user-friendly message otherwise
pub fn normalize_content(raw: &str, max_chars: usize) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Message content cannot be empty".to_string());
    }
    let chars = trimmed.chars().count();
    if chars > max_chars {
        return Err(format!(
            "Message content is too long ({} characters, maximum is {})",
            chars, max_chars
        ));
    }
    Ok(trimmed.to_string())
}

// ============================================================================
// Thread - derived per-conversation view, never stored
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub listing_id: Uuid,
    pub guest_id: Uuid,
    pub listing: ListingSummary,
    pub host: UserProfile,
    pub guest: UserProfile,
    pub last_message: Message,
    /// Counterparty messages the requesting user has not read yet
    pub unread_count: i64,
}

impl Thread {
    pub fn key(&self) -> ConversationKey {
        ConversationKey::new(self.listing_id, self.guest_id)
    }
}
