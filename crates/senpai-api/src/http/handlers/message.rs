//! Message HTTP handlers.
//!
//! Endpoints:
//! - GET  /api/chat/sessions/{id}/messages - Session history (greeting-seeded)
//! - POST /api/chat/sessions/{id}/messages - Post a message, get the reply

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use senpai_types::chat::{ChatMessage, ChatReply};

use crate::http::error::AppError;
use crate::http::handlers::parse_uuid;
use crate::state::AppState;

/// Request body for posting a message.
///
/// `content` defaults to empty so a missing field reaches the same
/// validation path as an empty one.
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    #[serde(default)]
    pub content: String,
}

/// GET /api/chat/sessions/{id}/messages - Chronological session history.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let sid = parse_uuid(&session_id)?;
    let messages = state.chat_service.history(&sid).await?;
    Ok(Json(messages))
}

/// POST /api/chat/sessions/{id}/messages - Append a user message and
/// return the assistant's reply.
///
/// The required `content` field is checked before the service is invoked;
/// the cancellation token bounds the upstream call together with the
/// assistant client's deadline.
pub async fn post_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<PostMessageRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let sid = parse_uuid(&session_id)?;

    if body.content.trim().is_empty() {
        return Err(AppError::Validation(
            "message content is required".to_string(),
        ));
    }

    let cancel = CancellationToken::new();
    let reply = state
        .chat_service
        .post_message(&sid, &body.content, &cancel)
        .await?;
    Ok(Json(reply))
}
