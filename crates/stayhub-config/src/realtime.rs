// ============================================================================
// Realtime (WebSocket) Configuration
// ============================================================================

use crate::constants::{
    DEFAULT_WS_MAX_ERRORS, DEFAULT_WS_MAX_MESSAGES_PER_MINUTE, DEFAULT_WS_OUTBOUND_QUEUE,
    MAX_WS_FRAME_SIZE,
};
use crate::env_parse_at_least;

#[derive(Clone, Debug)]
pub struct RealtimeConfig {
    /// Client events accepted per connection per minute before disconnecting
    pub max_messages_per_minute: u64,
    /// Malformed events tolerated per connection before disconnecting
    pub max_errors: u64,
    /// Largest accepted text frame in bytes
    pub max_frame_size: usize,
    /// Pushed events buffered per connection; further pushes are dropped
    pub outbound_queue_size: usize,
}

impl RealtimeConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            max_messages_per_minute: env_parse_at_least(
                "WS_MAX_MESSAGES_PER_MINUTE",
                DEFAULT_WS_MAX_MESSAGES_PER_MINUTE,
                1,
            ),
            max_errors: env_parse_at_least("WS_MAX_ERRORS", DEFAULT_WS_MAX_ERRORS, 1),
            max_frame_size: env_parse_at_least("WS_MAX_FRAME_SIZE", MAX_WS_FRAME_SIZE, 1),
            outbound_queue_size: env_parse_at_least(
                "WS_OUTBOUND_QUEUE",
                DEFAULT_WS_OUTBOUND_QUEUE,
                1,
            ),
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_messages_per_minute: DEFAULT_WS_MAX_MESSAGES_PER_MINUTE,
            max_errors: DEFAULT_WS_MAX_ERRORS,
            max_frame_size: MAX_WS_FRAME_SIZE,
            outbound_queue_size: DEFAULT_WS_OUTBOUND_QUEUE,
        }
    }
}
