// ============================================================================
// Stayhub Types - Core Data Types
// ============================================================================
//
// Data structures shared across the marketplace service. NO dependencies on
// business logic, databases, or transports.
//
// Contents:
// - Chat messages, conversation keys and derived threads
// - Bookings and date ranges (half-open overlap rule)
// - Notifications
// - Directory projections (listings, user profiles)
// - Realtime client/server event protocol
//
// ============================================================================

pub mod booking;
pub mod directory;
pub mod events;
pub mod message;
pub mod notification;

// Re-exports for convenience
pub use booking::*;
pub use directory::*;
pub use events::*;
pub use message::*;
pub use notification::*;
