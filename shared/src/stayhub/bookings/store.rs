use chrono::{DateTime, NaiveDate, Utc};
use stayhub_db::{DbPool, is_exclusion_violation};
use stayhub_error::{AppError, AppResult};
use stayhub_types::{Booking, BookingStatus, NewBooking, StayRange};
use uuid::Uuid;

/// Message of every booking overlap rejection
pub const DATES_UNAVAILABLE: &str = "Selected dates are not available";

/// Storage interface for the booking ledger
#[async_trait::async_trait]
pub trait BookingStore: Send + Sync {
    /// Insert a confirmed booking unless it overlaps a confirmed booking of
    /// the same listing. The overlap check and the insert are one atomic step;
    /// an overlap yields `Conflict`.
    async fn insert_confirmed(&self, booking: NewBooking) -> AppResult<Booking>;

    async fn get(&self, booking_id: Uuid) -> AppResult<Option<Booking>>;

    /// Returns `NotFound` if the booking does not exist
    async fn set_status(&self, booking_id: Uuid, status: BookingStatus) -> AppResult<Booking>;

    /// Date ranges held by confirmed bookings, earliest first
    async fn confirmed_ranges(&self, listing_id: Uuid) -> AppResult<Vec<StayRange>>;

    /// Bookings made by a guest, newest first
    async fn list_for_guest(&self, user_id: Uuid) -> AppResult<Vec<Booking>>;

    /// Bookings on any of the listings, newest first
    async fn list_for_listings(&self, listing_ids: &[Uuid]) -> AppResult<Vec<Booking>>;
}

/// Advisory lock key of a listing: the first 8 bytes of its id
fn advisory_key(listing_id: Uuid) -> i64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&listing_id.as_bytes()[..8]);
    i64::from_be_bytes(bytes)
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    listing_id: Uuid,
    user_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    total_price: f64,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            listing_id: row.listing_id,
            user_id: row.user_id,
            check_in: row.check_in,
            check_out: row.check_out,
            total_price: row.total_price,
            status: row.status.parse().map_err(AppError::Internal)?,
            created_at: row.created_at,
        })
    }
}

const BOOKING_COLUMNS: &str =
    "id, listing_id, user_id, check_in, check_out, total_price, status, created_at";

/// PostgreSQL implementation of BookingStore
///
/// Inserts serialize per listing on a transaction-scoped advisory lock. The
/// `bookings_no_overlap` exclusion constraint rejects anything that slips
/// past the check.
pub struct PostgresBookingStore {
    pool: DbPool,
}

impl PostgresBookingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl BookingStore for PostgresBookingStore {
    async fn insert_confirmed(&self, booking: NewBooking) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(advisory_key(booking.listing_id))
            .execute(&mut *tx)
            .await?;

        let overlapping: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM bookings
                WHERE listing_id = $1
                  AND status = 'confirmed'
                  AND check_in < $3
                  AND $2 < check_out
            )
            "#,
        )
        .bind(booking.listing_id)
        .bind(booking.range.check_in)
        .bind(booking.range.check_out)
        .fetch_one(&mut *tx)
        .await?;

        if overlapping {
            // Dropping the transaction rolls it back and releases the lock
            return Err(AppError::conflict(DATES_UNAVAILABLE));
        }

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            INSERT INTO bookings (id, listing_id, user_id, check_in, check_out, total_price, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'confirmed')
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(booking.listing_id)
        .bind(booking.guest_id)
        .bind(booking.range.check_in)
        .bind(booking.range.check_out)
        .bind(booking.total_price)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_exclusion_violation(&e) {
                AppError::conflict(DATES_UNAVAILABLE)
            } else {
                AppError::from(e)
            }
        })?;

        tx.commit().await?;
        row.try_into()
    }

    async fn get(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Booking::try_from).transpose()
    }

    async fn set_status(&self, booking_id: Uuid, status: BookingStatus) -> AppResult<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "UPDATE bookings SET status = $2 WHERE id = $1 RETURNING {}",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            // Re-confirming a cancelled stay can collide with a newer booking
            if is_exclusion_violation(&e) {
                AppError::conflict(DATES_UNAVAILABLE)
            } else {
                AppError::from(e)
            }
        })?
        .ok_or_else(|| AppError::not_found("Booking not found"))?;

        row.try_into()
    }

    async fn confirmed_ranges(&self, listing_id: Uuid) -> AppResult<Vec<StayRange>> {
        let rows = sqlx::query_as::<_, (NaiveDate, NaiveDate)>(
            r#"
            SELECT check_in, check_out
            FROM bookings
            WHERE listing_id = $1 AND status = 'confirmed'
            ORDER BY check_in
            "#,
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(check_in, check_out)| StayRange {
                check_in,
                check_out,
            })
            .collect())
    }

    async fn list_for_guest(&self, user_id: Uuid) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC, id",
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn list_for_listings(&self, listing_ids: &[Uuid]) -> AppResult<Vec<Booking>> {
        if listing_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE listing_id = ANY($1) ORDER BY created_at DESC, id",
            BOOKING_COLUMNS
        ))
        .bind(listing_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advisory_key_is_stable_per_listing() {
        let listing = Uuid::parse_str("0123456789abcdef0123456789abcdef").unwrap();
        assert_eq!(advisory_key(listing), 0x0123_4567_89ab_cdef);
        assert_eq!(advisory_key(listing), advisory_key(listing));
    }
}
