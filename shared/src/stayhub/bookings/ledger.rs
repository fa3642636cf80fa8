// ============================================================================
// BookingLedger - create, cancel and query reservations
// ============================================================================
//
// Create and cancel take the listing's lock before touching the store, so
// two requests for the same listing never interleave while requests for
// different listings proceed in parallel. The store's own atomic
// check-and-insert is the second line: it also holds across processes.
//
// Notifications and email go out after the lock is released and can never
// undo or fail a booking.
//
// ============================================================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use stayhub_config::LoggingConfig;
use stayhub_error::{AppError, AppResult};
use stayhub_metrics::BOOKINGS_TOTAL;
use stayhub_types::{
    Booking, BookingStatus, ListingSummary, NewBooking, NewNotification, NotificationType,
    StayRange,
};
use uuid::Uuid;

use super::BookingStore;
use crate::directory::Directory;
use crate::email::{EmailDispatcher, EmailMessage, send_in_background};
use crate::locks::KeyedLocks;
use crate::notifications::Notifier;
use crate::utils::log_user;

/// Booking request as submitted by a guest
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub listing_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub total_price: f64,
}

pub struct BookingLedger {
    store: Arc<dyn BookingStore>,
    directory: Arc<dyn Directory>,
    notifier: Arc<Notifier>,
    email: Arc<dyn EmailDispatcher>,
    listing_locks: KeyedLocks<Uuid>,
    logging: LoggingConfig,
}

impl BookingLedger {
    pub fn new(
        store: Arc<dyn BookingStore>,
        directory: Arc<dyn Directory>,
        notifier: Arc<Notifier>,
        email: Arc<dyn EmailDispatcher>,
        logging: LoggingConfig,
    ) -> Self {
        Self {
            store,
            directory,
            notifier,
            email,
            listing_locks: KeyedLocks::new(),
            logging,
        }
    }

    /// Reserve a stay for `guest_id`.
    ///
    /// # Errors
    /// - `Validation` for an empty/inverted range, a negative price, or a
    ///   host booking their own listing
    /// - `NotFound` if the listing does not exist
    /// - `Conflict` if a confirmed booking already holds any of the nights
    pub async fn create(&self, guest_id: Uuid, request: BookingRequest) -> AppResult<Booking> {
        let range =
            StayRange::new(request.check_in, request.check_out).map_err(AppError::Validation)?;
        if !request.total_price.is_finite() || request.total_price < 0.0 {
            return Err(AppError::validation(
                "Total price must be a non-negative amount",
            ));
        }

        let listing = self
            .directory
            .listing(request.listing_id)
            .await?
            .ok_or_else(|| AppError::not_found("Listing not found"))?;
        if listing.is_owned_by(guest_id) {
            return Err(AppError::validation("You cannot book your own listing"));
        }

        let guard = self.listing_locks.lock(&listing.id).await;
        let result = self
            .store
            .insert_confirmed(NewBooking {
                listing_id: listing.id,
                guest_id,
                range,
                total_price: request.total_price,
            })
            .await;
        drop(guard);

        let booking = match result {
            Ok(booking) => booking,
            Err(e) => {
                if matches!(e, AppError::Conflict(_)) {
                    BOOKINGS_TOTAL.with_label_values(&["conflict"]).inc();
                    tracing::info!(
                        listing_id = %listing.id,
                        check_in = %range.check_in,
                        check_out = %range.check_out,
                        "Booking rejected: dates unavailable"
                    );
                }
                return Err(e);
            }
        };

        BOOKINGS_TOTAL.with_label_values(&["created"]).inc();
        tracing::info!(
            booking_id = %booking.id,
            listing_id = %listing.id,
            guest = %log_user(guest_id, &self.logging),
            nights = range.nights(),
            "Booking confirmed"
        );

        self.announce_created(&booking, &listing).await;
        Ok(booking)
    }

    /// Cancel a booking on behalf of its guest or the listing's host.
    ///
    /// Cancelling an already cancelled booking returns it unchanged.
    pub async fn cancel(&self, booking_id: Uuid, actor_id: Uuid) -> AppResult<Booking> {
        let booking = self
            .store
            .get(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking not found"))?;
        let listing = self.directory.listing(booking.listing_id).await?;

        let is_guest = booking.user_id == actor_id;
        let is_host = listing.as_ref().is_some_and(|l| l.is_owned_by(actor_id));
        if !is_guest && !is_host {
            return Err(AppError::unauthorized(
                "Only the guest or the host can cancel this booking",
            ));
        }

        let guard = self.listing_locks.lock(&booking.listing_id).await;
        let current = self
            .store
            .get(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking not found"))?;
        if current.status == BookingStatus::Cancelled {
            return Ok(current);
        }
        let cancelled = self
            .store
            .set_status(booking_id, BookingStatus::Cancelled)
            .await?;
        drop(guard);

        BOOKINGS_TOTAL.with_label_values(&["cancelled"]).inc();
        tracing::info!(
            booking_id = %booking_id,
            listing_id = %cancelled.listing_id,
            by_host = is_host && !is_guest,
            "Booking cancelled"
        );

        self.announce_cancelled(&cancelled, listing.as_ref(), is_guest)
            .await;
        Ok(cancelled)
    }

    /// Nights held by confirmed bookings of a listing
    pub async fn taken_dates(&self, listing_id: Uuid) -> AppResult<Vec<StayRange>> {
        self.store.confirmed_ranges(listing_id).await
    }

    pub async fn my_bookings(&self, user_id: Uuid) -> AppResult<Vec<Booking>> {
        self.store.list_for_guest(user_id).await
    }

    /// Bookings on every listing the user hosts
    pub async fn host_bookings(&self, host_id: Uuid) -> AppResult<Vec<Booking>> {
        let listing_ids: Vec<Uuid> = self
            .directory
            .listings_owned_by(host_id)
            .await?
            .into_iter()
            .map(|l| l.id)
            .collect();
        self.store.list_for_listings(&listing_ids).await
    }

    async fn announce_created(&self, booking: &Booking, listing: &ListingSummary) {
        let dates = format!("{} to {}", booking.check_in, booking.check_out);
        let guest = self.directory.user(booking.user_id).await.ok().flatten();
        let guest_name = guest
            .as_ref()
            .map(|g| g.name.clone())
            .unwrap_or_else(|| "A guest".to_string());

        self.notifier
            .notify(NewNotification::new(
                booking.user_id,
                NotificationType::Booking,
                "Booking confirmed",
                format!("Your stay at {} from {} is confirmed.", listing.title, dates),
                "/trips",
            ))
            .await;
        self.notifier
            .notify(NewNotification::new(
                listing.owner_id,
                NotificationType::Booking,
                "New booking",
                format!("{} booked {} from {}.", guest_name, listing.title, dates),
                "/reservations",
            ))
            .await;

        if let Some(address) = guest.and_then(|g| g.email) {
            send_in_background(
                self.email.clone(),
                EmailMessage {
                    to: address,
                    subject: format!("Your booking at {} is confirmed", listing.title),
                    body: format!(
                        "<h1>Booking confirmed</h1><p>{}, {} nights. Total: {:.2}</p>",
                        dates,
                        booking.range().nights(),
                        booking.total_price
                    ),
                },
            );
        }
    }

    async fn announce_cancelled(
        &self,
        booking: &Booking,
        listing: Option<&ListingSummary>,
        by_guest: bool,
    ) {
        let title = listing.map(|l| l.title.as_str()).unwrap_or("your listing");
        let dates = format!("{} to {}", booking.check_in, booking.check_out);

        let notification = if by_guest {
            let Some(listing) = listing else {
                return;
            };
            NewNotification::new(
                listing.owner_id,
                NotificationType::Booking,
                "Booking cancelled",
                format!("The booking of {} from {} was cancelled by the guest.", title, dates),
                "/reservations",
            )
        } else {
            NewNotification::new(
                booking.user_id,
                NotificationType::Booking,
                "Booking cancelled",
                format!("Your stay at {} from {} was cancelled by the host.", title, dates),
                "/trips",
            )
        };

        self.notifier.notify(notification).await;
    }
}
