use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use stayhub_error::AppResult;
use stayhub_types::{ListingSummary, UserProfile};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Directory;

/// Directory contents as stored in a seed file
#[derive(Debug, Default, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub listings: Vec<ListingSummary>,
    #[serde(default)]
    pub users: Vec<UserProfile>,
}

/// Directory held in process memory, seeded through `insert_*` or a seed file
#[derive(Default)]
pub struct InMemoryDirectory {
    listings: RwLock<HashMap<Uuid, ListingSummary>>,
    users: RwLock<HashMap<Uuid, UserProfile>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_listing(&self, listing: ListingSummary) {
        self.listings.write().await.insert(listing.id, listing);
    }

    pub async fn insert_user(&self, user: UserProfile) {
        self.users.write().await.insert(user.id, user);
    }

    pub fn from_seed(seed: DirectorySeed) -> Self {
        Self {
            listings: RwLock::new(seed.listings.into_iter().map(|l| (l.id, l)).collect()),
            users: RwLock::new(seed.users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }

    /// Load a JSON seed file: `{"listings": [...], "users": [...]}`
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read directory seed {}", path.display()))?;
        let seed: DirectorySeed = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid directory seed {}", path.display()))?;
        Ok(Self::from_seed(seed))
    }
}

#[async_trait::async_trait]
impl Directory for InMemoryDirectory {
    async fn listing(&self, listing_id: Uuid) -> AppResult<Option<ListingSummary>> {
        Ok(self.listings.read().await.get(&listing_id).cloned())
    }

    async fn listings_owned_by(&self, user_id: Uuid) -> AppResult<Vec<ListingSummary>> {
        let listings = self.listings.read().await;
        let mut owned: Vec<ListingSummary> = listings
            .values()
            .filter(|l| l.is_owned_by(user_id))
            .cloned()
            .collect();
        owned.sort_by_key(|l| l.id);
        Ok(owned)
    }

    async fn user(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listings_owned_by_filters_on_owner() {
        let directory = InMemoryDirectory::new();
        let host = Uuid::new_v4();
        for owner in [host, host, Uuid::new_v4()] {
            directory
                .insert_listing(ListingSummary {
                    id: Uuid::new_v4(),
                    owner_id: owner,
                    title: "Cabin".to_string(),
                    images: vec![],
                })
                .await;
        }

        let owned = directory.listings_owned_by(host).await.unwrap();
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|l| l.owner_id == host));
        assert!(directory.user(host).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seed_json_is_camel_case() {
        let listing = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let seed: DirectorySeed = serde_json::from_value(serde_json::json!({
            "listings": [{"id": listing, "ownerId": owner, "title": "Loft"}],
            "users": [{"id": owner, "name": "Olga", "email": "olga@example.com"}]
        }))
        .unwrap();

        let directory = InMemoryDirectory::from_seed(seed);
        let found = directory.listing(listing).await.unwrap().unwrap();
        assert_eq!(found.owner_id, owner);
        assert!(found.images.is_empty());
        let user = directory.user(owner).await.unwrap().unwrap();
        assert_eq!(user.email.as_deref(), Some("olga@example.com"));
    }
}
