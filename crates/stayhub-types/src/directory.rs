use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the listing directory knows about a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub id: Uuid,
    /// The host
    pub owner_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl ListingSummary {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// Public identity of a user, as shown next to messages and threads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    /// Used for transactional email only, never sent to other users
    #[serde(skip_serializing, default)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub avatar: Option<String>,
}
