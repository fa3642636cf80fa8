use std::net::SocketAddr;
use std::time::Instant;

use futures_util::{SinkExt, StreamExt};
use stayhub_config::SECONDS_PER_MINUTE;
use stayhub_metrics::{CONNECTIONS_ACTIVE, CONNECTIONS_TOTAL};
use stayhub_types::ClientEvent;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use super::connection::{ConnectionHandler, WebSocketStreamType};
use super::events;
use crate::context::AppContext;

/// Accept realtime connections until the listener fails
pub async fn run_websocket_server(ctx: AppContext, listener: TcpListener) {
    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("Failed to accept socket: {}", e);
                continue;
            }
        };

        let ctx = ctx.clone();

        tokio::spawn(async move {
            match accept_async(socket).await {
                Ok(ws_stream) => handle_websocket(ws_stream, addr, ctx).await,
                Err(e) => tracing::debug!(addr = %addr, error = %e, "WebSocket handshake failed"),
            }
        });
    }
}

pub async fn handle_websocket(ws_stream: WebSocketStreamType, addr: SocketAddr, ctx: AppContext) {
    CONNECTIONS_TOTAL.inc();
    CONNECTIONS_ACTIVE.inc();

    let connection_id = ctx.hub.next_connection_id();
    tracing::info!(
        event = "websocket_connection_established",
        addr = %addr,
        connection_id,
        "New WebSocket connection established"
    );

    let limits = ctx.config.realtime.clone();

    let (ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::channel(limits.outbound_queue_size);
    let mut handler = ConnectionHandler::new(ws_sender, tx, connection_id, addr);

    let mut messages_received = 0u64;
    let mut errors_count = 0u64;
    let connection_start = Instant::now();
    let mut window_start = Instant::now();

    loop {
        tokio::select! {
            frame = ws_receiver.next() => {
                let Some(frame) = frame else {
                    break;
                };
                match frame {
                    Ok(WsMessage::Text(text)) => {
                        if window_start.elapsed().as_secs() >= SECONDS_PER_MINUTE {
                            window_start = Instant::now();
                            messages_received = 0;
                        }
                        if messages_received >= limits.max_messages_per_minute {
                            tracing::warn!(
                                event = "websocket_rate_limit_exceeded",
                                addr = %addr,
                                limit = limits.max_messages_per_minute,
                                "Connection rate limit exceeded - disconnecting"
                            );
                            handler.send_error(
                                "RATE_LIMIT_EXCEEDED",
                                &format!(
                                    "Too many messages ({}/min). Connection closed.",
                                    limits.max_messages_per_minute
                                ),
                            ).await;
                            break;
                        }
                        messages_received += 1;

                        if text.len() > limits.max_frame_size {
                            errors_count += 1;
                            handler.send_error("PAYLOAD_TOO_LARGE", "Message frame is too large").await;
                        } else {
                            match serde_json::from_str::<ClientEvent>(&text) {
                                Ok(ClientEvent::Identify(data)) => {
                                    events::handle_identify(&mut handler, &ctx, data).await;
                                }
                                Ok(ClientEvent::JoinRoom(data)) => {
                                    events::handle_join_room(&mut handler, &ctx, data).await;
                                }
                                Ok(ClientEvent::LeaveRoom(data)) => {
                                    events::handle_leave_room(&mut handler, &ctx, data).await;
                                }
                                Ok(ClientEvent::SendMessage(data)) => {
                                    events::handle_send_message(&mut handler, &ctx, data).await;
                                }
                                Ok(ClientEvent::Typing(data)) => {
                                    events::handle_typing(&mut handler, &ctx, data, false).await;
                                }
                                Ok(ClientEvent::StopTyping(data)) => {
                                    events::handle_typing(&mut handler, &ctx, data, true).await;
                                }
                                Err(e) => {
                                    errors_count += 1;
                                    tracing::warn!(
                                        event = "websocket_parse_error",
                                        addr = %addr,
                                        error = %e,
                                        error_count = errors_count,
                                        "Failed to parse WebSocket event"
                                    );
                                    handler.send_error("INVALID_FORMAT", "Invalid event format").await;
                                }
                            }
                        }

                        if errors_count >= limits.max_errors {
                            tracing::warn!(
                                event = "websocket_too_many_errors",
                                addr = %addr,
                                error_count = errors_count,
                                "Too many invalid events - disconnecting client"
                            );
                            handler.send_error(
                                "TOO_MANY_ERRORS",
                                "Too many invalid messages. Connection closed.",
                            ).await;
                            break;
                        }
                    }
                    Ok(WsMessage::Close(frame)) => {
                        tracing::info!(
                            event = "websocket_connection_closed",
                            addr = %addr,
                            close_code = ?frame.as_ref().map(|f| f.code),
                            messages_received,
                            "Connection closed by client"
                        );
                        break;
                    }
                    Ok(WsMessage::Ping(data)) => {
                        if handler.ws_sender_mut().send(WsMessage::Pong(data)).await.is_err() {
                            tracing::warn!(
                                event = "websocket_pong_send_failed",
                                addr = %addr,
                                "Failed to send pong - connection may be broken"
                            );
                            break;
                        }
                    }
                    Ok(WsMessage::Binary(_)) => {
                        handler.send_error(
                            "UNSUPPORTED_MESSAGE_TYPE",
                            "Only JSON text messages are supported",
                        ).await;
                    }
                    Ok(WsMessage::Pong(_)) | Ok(WsMessage::Frame(_)) => {}
                    Err(e) => {
                        tracing::debug!(
                            event = "websocket_stream_error",
                            addr = %addr,
                            error = %e,
                            "WebSocket stream error"
                        );
                        break;
                    }
                }
            }
            Some(event) = rx.recv() => {
                if let Err(e) = handler.send_event(&event).await {
                    tracing::debug!(
                        event = "websocket_send_failed",
                        addr = %addr,
                        error = %e,
                        "Failed to push event - connection may be broken"
                    );
                    break;
                }
            }
        }
    }

    handler.disconnect(&ctx.hub).await;

    tracing::info!(
        event = "websocket_connection_ended",
        addr = %addr,
        identified = handler.user_id().is_some(),
        messages_received,
        errors_count,
        duration_secs = connection_start.elapsed().as_secs(),
        "WebSocket connection ended"
    );

    CONNECTIONS_ACTIVE.dec();
}
