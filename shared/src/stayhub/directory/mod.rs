// ============================================================================
// Directory - listings and user profiles owned by the wider marketplace
// ============================================================================
//
// The chat, booking and notification core only reads from the directory:
// who owns a listing, what a listing is called, and how a user is shown.
//
// ============================================================================

mod memory;
mod postgres;

pub use memory::{DirectorySeed, InMemoryDirectory};
pub use postgres::PostgresDirectory;

use stayhub_error::AppResult;
use stayhub_types::{ListingSummary, UserProfile};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait Directory: Send + Sync {
    async fn listing(&self, listing_id: Uuid) -> AppResult<Option<ListingSummary>>;

    /// Every listing the user hosts
    async fn listings_owned_by(&self, user_id: Uuid) -> AppResult<Vec<ListingSummary>>;

    async fn user(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;
}
