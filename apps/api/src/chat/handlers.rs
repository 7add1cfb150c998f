use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::chat::models::ChatView;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatTurnRequest {
    pub text: String,
}

/// GET /api/v1/sessions/:id/chat
pub async fn handle_get_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatView>, AppError> {
    let conversation = state.sessions.get(id).await?.conversation().await?;
    Ok(Json(conversation.view().await))
}

/// POST /api/v1/sessions/:id/chat/messages
///
/// Waits for the consultant's reply and returns the whole transcript.
/// A transport failure shows up as the fallback reply, not as an error.
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatTurnRequest>,
) -> Result<Json<ChatView>, AppError> {
    let conversation = state.sessions.get(id).await?.conversation().await?;
    conversation.send(&request.text).await?;
    Ok(Json(conversation.view().await))
}

/// POST /api/v1/sessions/:id/chat/reset
pub async fn handle_reset_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatView>, AppError> {
    let conversation = state.sessions.get(id).await?.conversation().await?;
    Ok(Json(conversation.reset().await))
}
