// ============================================================================
// Bookings Routes
// ============================================================================
//
// Endpoints:
// - POST /api/v1/bookings - Reserve a stay
// - PUT  /api/v1/bookings/:id/cancel - Cancel as guest or host
// - GET  /api/v1/bookings/mine - Caller's reservations
// - GET  /api/v1/bookings/host - Reservations on the caller's listings
// - GET  /api/v1/listings/:id/taken-dates - Confirmed ranges of a listing
//
// ============================================================================

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::bookings::BookingRequest;
use crate::context::AppContext;
use crate::routes::extractors::TrustedUser;
use stayhub_error::AppError;

/// POST /api/v1/bookings
pub async fn create_booking(
    State(app_context): State<Arc<AppContext>>,
    TrustedUser(guest_id): TrustedUser,
    Json(request): Json<BookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = app_context.bookings.create(guest_id, request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// PUT /api/v1/bookings/:id/cancel
pub async fn cancel_booking(
    State(app_context): State<Arc<AppContext>>,
    TrustedUser(user_id): TrustedUser,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let booking = app_context.bookings.cancel(booking_id, user_id).await?;
    Ok(Json(booking))
}

/// GET /api/v1/bookings/mine
pub async fn my_bookings(
    State(app_context): State<Arc<AppContext>>,
    TrustedUser(user_id): TrustedUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_context.bookings.my_bookings(user_id).await?))
}

/// GET /api/v1/bookings/host
pub async fn host_bookings(
    State(app_context): State<Arc<AppContext>>,
    TrustedUser(user_id): TrustedUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_context.bookings.host_bookings(user_id).await?))
}

/// GET /api/v1/listings/:id/taken-dates
///
/// Public: availability is shown before sign-in.
pub async fn taken_dates(
    State(app_context): State<Arc<AppContext>>,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_context.bookings.taken_dates(listing_id).await?))
}
