// ============================================================================
// Notifications Routes
// ============================================================================
//
// Endpoints:
// - GET /api/v1/notifications?limit= - Most recent notifications
// - PUT /api/v1/notifications/read-all - Mark the whole feed read
//
// ============================================================================

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::context::AppContext;
use crate::routes::extractors::TrustedUser;
use stayhub_error::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

/// GET /api/v1/notifications
pub async fn list_notifications(
    State(app_context): State<Arc<AppContext>>,
    TrustedUser(user_id): TrustedUser,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let notifications = app_context
        .notifier
        .list_recent(user_id, params.limit)
        .await?;
    Ok(Json(notifications))
}

/// PUT /api/v1/notifications/read-all
pub async fn mark_all_read(
    State(app_context): State<Arc<AppContext>>,
    TrustedUser(user_id): TrustedUser,
) -> Result<impl IntoResponse, AppError> {
    let updated = app_context.notifier.mark_all_read(user_id).await?;
    Ok(Json(json!({ "updated": updated })))
}
