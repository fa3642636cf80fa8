// ============================================================================
// Messages - chat persistence, send pipeline and inbox aggregation
// ============================================================================

mod inbox;
mod memory;
mod service;
mod store;

pub use inbox::{InboxAggregator, ThreadSummary, summarize_threads};
pub use memory::InMemoryMessageStore;
pub use service::ChatService;
pub use store::{MessageStore, PostgresMessageStore};
