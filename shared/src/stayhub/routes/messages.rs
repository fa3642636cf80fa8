// ============================================================================
// Messages Routes
// ============================================================================
//
// Endpoints:
// - GET  /api/v1/inbox - Threads of the caller, newest first
// - POST /api/v1/messages - Send a message (same pipeline as realtime)
// - GET  /api/v1/messages/:listing_id/:guest_id - Conversation history
// - PUT  /api/v1/messages/:listing_id/:guest_id/read - Mark thread read
//
// ============================================================================

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::context::AppContext;
use crate::routes::extractors::TrustedUser;
use stayhub_error::AppError;
use stayhub_types::ConversationKey;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub listing_id: Uuid,
    pub guest_id: Uuid,
    pub content: String,
}

/// GET /api/v1/inbox
pub async fn inbox(
    State(app_context): State<Arc<AppContext>>,
    TrustedUser(user_id): TrustedUser,
) -> Result<impl IntoResponse, AppError> {
    let threads = app_context.inbox.inbox(user_id).await?;
    Ok(Json(threads))
}

/// POST /api/v1/messages
pub async fn send_message(
    State(app_context): State<Arc<AppContext>>,
    TrustedUser(sender_id): TrustedUser,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let key = ConversationKey::new(request.listing_id, request.guest_id);
    let delivered = app_context
        .chat
        .send(sender_id, key, &request.content)
        .await?;
    Ok((StatusCode::CREATED, Json(delivered)))
}

/// GET /api/v1/messages/:listing_id/:guest_id
pub async fn history(
    State(app_context): State<Arc<AppContext>>,
    TrustedUser(user_id): TrustedUser,
    Path((listing_id, guest_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let messages = app_context
        .chat
        .history(ConversationKey::new(listing_id, guest_id), user_id)
        .await?;
    Ok(Json(messages))
}

/// PUT /api/v1/messages/:listing_id/:guest_id/read
pub async fn mark_read(
    State(app_context): State<Arc<AppContext>>,
    TrustedUser(user_id): TrustedUser,
    Path((listing_id, guest_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let updated = app_context
        .chat
        .mark_read(ConversationKey::new(listing_id, guest_id), user_id)
        .await?;
    Ok(Json(json!({ "updated": updated })))
}
