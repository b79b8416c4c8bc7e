//! Session HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/chat/sessions      - Create a session for the default user
//! - GET    /api/chat/sessions      - List the default user's sessions
//! - DELETE /api/chat/sessions/{id} - Delete a session and its messages

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use senpai_types::chat::ChatSession;

use crate::http::error::AppError;
use crate::http::handlers::parse_uuid;
use crate::state::AppState;

/// Request body for session creation. `{}` is a valid body.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub title: Option<String>,
}

/// POST /api/chat/sessions - Create a new session.
pub async fn create_session(
    State(state): State<AppState>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<Json<ChatSession>, AppError> {
    let session = state.chat_service.create_session(body.title).await?;
    Ok(Json(session))
}

/// GET /api/chat/sessions - List the default user's sessions, most recent
/// first. An empty list is a valid response, not an error.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChatSession>>, AppError> {
    let user = state.chat_service.current_user().await?;
    let sessions = state.chat_service.list_sessions(&user.id).await?;
    Ok(Json(sessions))
}

/// DELETE /api/chat/sessions/{id} - Delete a session and its messages.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let sid = parse_uuid(&session_id)?;
    state.chat_service.delete_session(&sid).await?;
    Ok(Json(serde_json::json!({"deleted": true})))
}
