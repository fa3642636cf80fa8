use chrono::Utc;
use stayhub_error::{AppError, AppResult};
use stayhub_types::{Booking, BookingStatus, NewBooking, StayRange};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BookingStore, DATES_UNAVAILABLE};

/// Process-local booking ledger; newest booking is last
#[derive(Default)]
pub struct InMemoryBookingStore {
    bookings: RwLock<Vec<Booking>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut bookings: Vec<Booking>) -> Vec<Booking> {
    bookings.reverse();
    bookings
}

#[async_trait::async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert_confirmed(&self, booking: NewBooking) -> AppResult<Booking> {
        let mut bookings = self.bookings.write().await;

        let taken = bookings.iter().any(|b| {
            b.listing_id == booking.listing_id
                && b.is_confirmed()
                && b.range().overlaps(&booking.range)
        });
        if taken {
            return Err(AppError::conflict(DATES_UNAVAILABLE));
        }

        let stored = Booking {
            id: Uuid::new_v4(),
            listing_id: booking.listing_id,
            user_id: booking.guest_id,
            check_in: booking.range.check_in,
            check_out: booking.range.check_out,
            total_price: booking.total_price,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        };
        bookings.push(stored.clone());
        Ok(stored)
    }

    async fn get(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        Ok(self
            .bookings
            .read()
            .await
            .iter()
            .find(|b| b.id == booking_id)
            .cloned())
    }

    async fn set_status(&self, booking_id: Uuid, status: BookingStatus) -> AppResult<Booking> {
        let mut bookings = self.bookings.write().await;
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| AppError::not_found("Booking not found"))?;
        booking.status = status;
        Ok(booking.clone())
    }

    async fn confirmed_ranges(&self, listing_id: Uuid) -> AppResult<Vec<StayRange>> {
        let mut ranges: Vec<StayRange> = self
            .bookings
            .read()
            .await
            .iter()
            .filter(|b| b.listing_id == listing_id && b.is_confirmed())
            .map(Booking::range)
            .collect();
        ranges.sort_by_key(|r| r.check_in);
        Ok(ranges)
    }

    async fn list_for_guest(&self, user_id: Uuid) -> AppResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(newest_first(
            bookings
                .iter()
                .filter(|b| b.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_for_listings(&self, listing_ids: &[Uuid]) -> AppResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(newest_first(
            bookings
                .iter()
                .filter(|b| listing_ids.contains(&b.listing_id))
                .cloned()
                .collect(),
        ))
    }
}
