use stayhub_db::DbPool;
use stayhub_error::AppResult;
use stayhub_types::{ListingSummary, UserProfile};
use uuid::Uuid;

use super::Directory;

type ListingRow = (Uuid, Uuid, String, Vec<String>);
type UserRow = (Uuid, String, Option<String>, Option<String>);

fn listing_from_row((id, owner_id, title, images): ListingRow) -> ListingSummary {
    ListingSummary {
        id,
        owner_id,
        title,
        images,
    }
}

/// Directory backed by the `listings` and `users` tables
pub struct PostgresDirectory {
    pool: DbPool,
}

impl PostgresDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Directory for PostgresDirectory {
    async fn listing(&self, listing_id: Uuid) -> AppResult<Option<ListingSummary>> {
        let row = sqlx::query_as::<_, ListingRow>(
            r#"
            SELECT id, owner_id, title, images
            FROM listings
            WHERE id = $1
            "#,
        )
        .bind(listing_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(listing_from_row))
    }

    async fn listings_owned_by(&self, user_id: Uuid) -> AppResult<Vec<ListingSummary>> {
        let rows = sqlx::query_as::<_, ListingRow>(
            r#"
            SELECT id, owner_id, title, images
            FROM listings
            WHERE owner_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(listing_from_row).collect())
    }

    async fn user(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, avatar
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, name, email, avatar)| UserProfile {
            id,
            name,
            email,
            avatar,
        }))
    }
}
