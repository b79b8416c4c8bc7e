//! User HTTP handlers.
//!
//! Authentication is absent in this deployment: `/api/auth/user` returns
//! the fixed default user, created lazily on first request.

use axum::Json;
use axum::extract::State;

use senpai_types::user::User;

use crate::http::error::AppError;
use crate::state::AppState;

/// GET /api/auth/user - The default user for the no-auth deployment.
pub async fn get_current_user(State(state): State<AppState>) -> Result<Json<User>, AppError> {
    let user = state.chat_service.current_user().await?;
    Ok(Json(user))
}
