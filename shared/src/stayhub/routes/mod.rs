// ============================================================================
// Axum Routes Module
// ============================================================================
//
// Structure:
// - mod.rs: Main router assembly and middleware
// - health.rs: Health check and metrics endpoints
// - messages.rs: Inbox, history, read state and REST send
// - bookings.rs: Booking ledger endpoints
// - notifications.rs: Notification feed endpoints
// - extractors.rs: TrustedUser (gateway-propagated identity)
// - middleware.rs: Request logging
//
// ============================================================================

mod bookings;
mod extractors;
mod health;
mod messages;
mod middleware;
mod notifications;

pub use extractors::{TrustedUser, USER_ID_HEADER};

use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;

/// Create the main application router with all routes
pub fn create_router(app_context: Arc<AppContext>) -> Router {
    Router::new()
        // Health and monitoring
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness))
        .route("/metrics", get(health::metrics))
        // Messaging
        .route("/api/v1/inbox", get(messages::inbox))
        .route("/api/v1/messages", post(messages::send_message))
        .route(
            "/api/v1/messages/:listing_id/:guest_id",
            get(messages::history),
        )
        .route(
            "/api/v1/messages/:listing_id/:guest_id/read",
            put(messages::mark_read),
        )
        // Bookings
        .route("/api/v1/bookings", post(bookings::create_booking))
        .route("/api/v1/bookings/mine", get(bookings::my_bookings))
        .route("/api/v1/bookings/host", get(bookings::host_bookings))
        .route("/api/v1/bookings/:id/cancel", put(bookings::cancel_booking))
        .route(
            "/api/v1/listings/:id/taken-dates",
            get(bookings::taken_dates),
        )
        // Notifications
        .route(
            "/api/v1/notifications",
            get(notifications::list_notifications),
        )
        .route(
            "/api/v1/notifications/read-all",
            put(notifications::mark_all_read),
        )
        // Apply middleware (order matters - last added runs first)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(middleware::request_logging))
                .into_inner(),
        )
        .with_state(app_context)
}
