// ============================================================================
// Client Event Handlers
// ============================================================================
//
// Every handler reports failures to the client as an `error` event and
// keeps the connection open; only the connection loop decides to close.
//
// ============================================================================

use stayhub_error::AppError;
use stayhub_types::{
    IdentifyData, JoinedData, RoomData, SendMessageData, ServerEvent, TypingData,
};
use uuid::Uuid;

use super::connection::ConnectionHandler;
use super::hub::user_room;
use crate::context::AppContext;
use crate::utils::log_user;

/// Identified user of the connection, or an `AUTH_REQUIRED` error
async fn require_user(handler: &mut ConnectionHandler) -> Option<Uuid> {
    match handler.user_id() {
        Some(id) => Some(id),
        None => {
            handler
                .send_error("AUTH_REQUIRED", "Send an identify event first")
                .await;
            None
        }
    }
}

/// Rejects events whose claimed sender is not the identified user
async fn validate_sender(
    handler: &mut ConnectionHandler,
    ctx: &AppContext,
    claimed: Uuid,
) -> Option<Uuid> {
    let user_id = require_user(handler).await?;
    if claimed != user_id {
        tracing::warn!(
            user = %log_user(user_id, &ctx.config.logging),
            claimed = %log_user(claimed, &ctx.config.logging),
            "Sender spoofing attempt"
        );
        handler
            .send_error("FORBIDDEN", "senderId does not match the identified user")
            .await;
        return None;
    }
    Some(user_id)
}

async fn report(handler: &mut ConnectionHandler, err: AppError) {
    err.log();
    handler
        .send_error(err.error_code(), &err.user_message())
        .await;
}

pub async fn handle_identify(
    handler: &mut ConnectionHandler,
    ctx: &AppContext,
    data: IdentifyData,
) {
    if let Some(current) = handler.user_id() {
        if current != data.user_id {
            handler
                .send_error(
                    "ALREADY_IDENTIFIED",
                    "Connection is already identified as another user",
                )
                .await;
            return;
        }
    }

    handler.set_user_id(data.user_id);
    let room = user_room(data.user_id);
    ctx.hub.join(handler.id(), &room, handler.tx().clone()).await;

    tracing::info!(
        user = %log_user(data.user_id, &ctx.config.logging),
        addr = %handler.addr(),
        "Realtime client identified"
    );

    if let Err(e) = handler
        .send_event(&ServerEvent::Joined(JoinedData { room }))
        .await
    {
        tracing::debug!(error = %e, "Failed to acknowledge identify");
    }
}

pub async fn handle_join_room(handler: &mut ConnectionHandler, ctx: &AppContext, data: RoomData) {
    let Some(user_id) = require_user(handler).await else {
        return;
    };
    let key = data.key();
    if let Err(e) = ctx.chat.ensure_participant(key, user_id).await {
        report(handler, e).await;
        return;
    }

    let room = key.room_name();
    ctx.hub.join(handler.id(), &room, handler.tx().clone()).await;

    if let Err(e) = handler
        .send_event(&ServerEvent::Joined(JoinedData { room }))
        .await
    {
        tracing::debug!(error = %e, "Failed to acknowledge join_room");
    }
}

pub async fn handle_leave_room(handler: &mut ConnectionHandler, ctx: &AppContext, data: RoomData) {
    ctx.hub.leave(handler.id(), &data.key().room_name()).await;
}

pub async fn handle_send_message(
    handler: &mut ConnectionHandler,
    ctx: &AppContext,
    data: SendMessageData,
) {
    let Some(sender_id) = validate_sender(handler, ctx, data.sender_id).await else {
        return;
    };

    // Delivery to this connection, if it joined the room, comes back
    // through the hub like for every other member
    if let Err(e) = ctx.chat.send(sender_id, data.key(), &data.content).await {
        report(handler, e).await;
    }
}

pub async fn handle_typing(
    handler: &mut ConnectionHandler,
    ctx: &AppContext,
    data: TypingData,
    stopped: bool,
) {
    if validate_sender(handler, ctx, data.sender_id).await.is_none() {
        return;
    }

    let room = data.key().room_name();
    if !ctx.hub.is_member(handler.id(), &room).await {
        handler
            .send_error("NOT_IN_ROOM", "Join the conversation before sending typing events")
            .await;
        return;
    }

    let event = if stopped {
        ServerEvent::StopTyping(data)
    } else {
        ServerEvent::Typing(data)
    };
    ctx.hub.broadcast_except(&room, handler.id(), &event).await;
}
