//! Prometheus metrics for the Stayhub marketplace service
//!
//! Provides centralized metrics collection for monitoring:
//! - Chat messages and realtime connections
//! - Booking outcomes
//! - Notification fan-out failures

use anyhow::Result;
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, IntCounter, IntCounterVec, IntGauge, TextEncoder, opts, register_int_counter,
    register_int_counter_vec, register_int_gauge,
};

// ============================================================================
// Message Metrics
// ============================================================================

/// Total number of chat messages stored
pub static MESSAGES_SENT_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "stayhub_messages_sent_total",
        "Total number of chat messages stored"
    ))
    .expect("Failed to register MESSAGES_SENT_TOTAL metric")
});

// ============================================================================
// Realtime Metrics
// ============================================================================

/// Total number of realtime connections accepted
pub static CONNECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "stayhub_realtime_connections_total",
        "Total number of realtime connections accepted"
    ))
    .expect("Failed to register CONNECTIONS_TOTAL metric")
});

/// Currently open realtime connections
pub static CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(opts!(
        "stayhub_realtime_connections_active",
        "Currently open realtime connections"
    ))
    .expect("Failed to register CONNECTIONS_ACTIVE metric")
});

// ============================================================================
// Booking Metrics
// ============================================================================

/// Booking attempts by outcome (created, conflict, cancelled)
pub static BOOKINGS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("stayhub_bookings_total", "Booking ledger operations by outcome"),
        &["outcome"]
    )
    .expect("Failed to register BOOKINGS_TOTAL metric")
});

// ============================================================================
// Notification Metrics
// ============================================================================

/// Notifications that could not be stored (swallowed by the fan-out)
pub static NOTIFICATIONS_FAILED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "stayhub_notifications_failed_total",
        "Notifications dropped because the store rejected them"
    ))
    .expect("Failed to register NOTIFICATIONS_FAILED_TOTAL metric")
});

// ============================================================================
// Metrics Collection
// ============================================================================

/// Gather all registered metrics and encode as Prometheus text format
pub fn gather_metrics() -> Result<String> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode(&metric_families, &mut buffer)?;

    Ok(String::from_utf8(buffer)?)
}
