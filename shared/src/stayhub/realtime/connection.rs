use std::net::SocketAddr;

use futures_util::SinkExt;
use futures_util::stream::SplitSink;
use stayhub_types::ServerEvent;
use tokio::net::TcpStream;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use uuid::Uuid;

use super::hub::{ConnectionId, EventSender, RealtimeHub};

pub type WebSocketStreamType = WebSocketStream<TcpStream>;

/// State of one realtime connection
pub struct ConnectionHandler {
    ws_sender: SplitSink<WebSocketStreamType, WsMessage>,
    tx: EventSender,
    id: ConnectionId,
    user_id: Option<Uuid>,
    addr: SocketAddr,
}

impl ConnectionHandler {
    pub fn new(
        ws_sender: SplitSink<WebSocketStreamType, WsMessage>,
        tx: EventSender,
        id: ConnectionId,
        addr: SocketAddr,
    ) -> Self {
        Self {
            ws_sender,
            tx,
            id,
            user_id: None,
            addr,
        }
    }

    /// Write one event as a JSON text frame
    pub async fn send_event(&mut self, event: &ServerEvent) -> Result<(), String> {
        let text = serde_json::to_string(event)
            .map_err(|e| format!("Failed to serialize event: {}", e))?;

        self.ws_sender
            .send(WsMessage::Text(text))
            .await
            .map_err(|e| format!("Failed to send event: {}", e))?;

        Ok(())
    }

    pub async fn send_error(&mut self, code: &str, message: &str) {
        if self
            .send_event(&ServerEvent::error(code, message))
            .await
            .is_err()
        {
            tracing::debug!("Failed to send error to disconnected client {}", self.addr);
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    pub fn set_user_id(&mut self, id: Uuid) {
        self.user_id = Some(id);
    }

    pub fn tx(&self) -> &EventSender {
        &self.tx
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn ws_sender_mut(&mut self) -> &mut SplitSink<WebSocketStreamType, WsMessage> {
        &mut self.ws_sender
    }

    /// Leave every room this connection joined
    pub async fn disconnect(&mut self, hub: &RealtimeHub) {
        hub.disconnect(self.id).await;
    }
}
