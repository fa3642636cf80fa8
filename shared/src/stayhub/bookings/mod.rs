// ============================================================================
// Bookings - reservation ledger with per-listing overlap prevention
// ============================================================================

mod ledger;
mod memory;
mod store;

pub use ledger::{BookingLedger, BookingRequest};
pub use memory::InMemoryBookingStore;
pub use store::{BookingStore, DATES_UNAVAILABLE, PostgresBookingStore};
