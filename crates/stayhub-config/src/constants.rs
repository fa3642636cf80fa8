// ============================================================================
// Configuration Constants
// ============================================================================

// Default port values
pub(crate) const DEFAULT_PORT: u16 = 8080;
pub(crate) const DEFAULT_WS_PORT: u16 = 8090;

// Realtime connection limits
pub(crate) const DEFAULT_WS_MAX_MESSAGES_PER_MINUTE: u64 = 120;
pub(crate) const DEFAULT_WS_MAX_ERRORS: u64 = 10;
pub(crate) const DEFAULT_WS_OUTBOUND_QUEUE: usize = 256;

// Notification feed paging
pub const DEFAULT_NOTIFICATION_LIMIT: i64 = 20;
pub const MAX_NOTIFICATION_LIMIT: i64 = 100;

// Time conversion constants
pub const SECONDS_PER_MINUTE: u64 = 60;

// Content limits
// ============================================================================
// Chat content is plain text. 4000 characters covers any reasonable guest/host
// exchange; anything bigger is either abuse or a pasted document.
// Frame limit applies to the raw WebSocket frame (JSON envelope included).
// ============================================================================
pub const MAX_MESSAGE_CONTENT_CHARS: usize = 4000;
pub const MAX_WS_FRAME_SIZE: usize = 64 * 1024; // 64 KB
