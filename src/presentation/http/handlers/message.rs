//! Message Handlers

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::application::dto::{MarkReadRequest, MarkReadResponse, OrderQuery, SendMessageRequest};
use crate::application::services::ThreadView;
use crate::domain::Message;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Post a message to an application thread
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(application_id): Path<Uuid>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let message = state
        .threads
        .send_message(application_id, auth.user_id, body.content)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Get the thread of an application
pub async fn list_thread(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(application_id): Path<Uuid>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<ThreadView>, AppError> {
    let thread = state
        .threads
        .list_thread(application_id, auth.user_id, query.order)
        .await?;
    Ok(Json(thread))
}

/// Mark one message, or every message addressed to the caller, as read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(application_id): Path<Uuid>,
    body: Option<Json<MarkReadRequest>>,
) -> Result<Json<MarkReadResponse>, AppError> {
    let Json(body) = body.unwrap_or_default();

    let marked = state
        .threads
        .mark_read(application_id, auth.user_id, body.message_id)
        .await?;

    Ok(Json(MarkReadResponse { marked }))
}
