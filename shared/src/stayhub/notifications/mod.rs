// ============================================================================
// Notifications - persistent in-app feed plus a realtime refresh ping
// ============================================================================

mod fanout;
mod memory;
mod store;

pub use fanout::Notifier;
pub use memory::InMemoryNotificationStore;
pub use store::{NotificationStore, PostgresNotificationStore};
