// ============================================================================
// Realtime - WebSocket delivery of chat, typing and notification events
// ============================================================================

mod connection;
mod events;
mod hub;
mod server;

pub use connection::{ConnectionHandler, WebSocketStreamType};
pub use hub::{ConnectionId, EventSender, RealtimeHub, user_room};
pub use server::{handle_websocket, run_websocket_server};
