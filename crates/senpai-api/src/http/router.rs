//! Axum router configuration with middleware.
//!
//! All chat routes live under `/api`. Middleware: permissive CORS (the
//! browser frontend is served separately) and request tracing. Unknown
//! `/api/*` paths get a structured 404 body instead of an empty response.

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/auth/user", get(handlers::user::get_current_user))
        .route(
            "/chat/sessions",
            post(handlers::session::create_session).get(handlers::session::list_sessions),
        )
        .route(
            "/chat/sessions/{id}",
            delete(handlers::session::delete_session),
        )
        .route(
            "/chat/sessions/{id}/messages",
            get(handlers::message::get_messages).post(handlers::message::post_message),
        )
        .fallback(api_not_found);

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Structured 404 for unrecognized `/api/*` paths.
async fn api_not_found() -> (StatusCode, axum::Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        axum::Json(json!({
            "errors": [{
                "code": "NOT_FOUND",
                "message": "Unknown API route",
            }]
        })),
    )
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use senpai_core::chat::service::GREETING;
    use senpai_core::chat::store::BoxChatStore;
    use senpai_core::llm::assistant::{AssistantClient, REPLY_NOT_CONFIGURED};
    use senpai_infra::memory::chat::MemoryChatStore;

    /// Router over the in-memory store with no upstream configured.
    fn test_app() -> Router {
        let store = BoxChatStore::new(MemoryChatStore::new());
        let assistant =
            AssistantClient::new(None, "sonar".to_string(), Duration::from_secs(30));
        build_router(AppState::from_parts(store, assistant))
    }

    fn get(path: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn del(path: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_session(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(post_json("/api/chat/sessions", r#"{"title":"test"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        json["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_auth_user_returns_default_user() {
        let response = test_app().oneshot(get("/api/auth/user")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["id"], "local-user");
    }

    #[tokio::test]
    async fn test_create_and_list_sessions() {
        let app = test_app();
        let id = create_session(&app).await;

        let response = app.clone().oneshot(get("/api/chat/sessions")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let sessions = json.as_array().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0]["id"], id.as_str());
        assert_eq!(sessions[0]["title"], "test");
    }

    #[tokio::test]
    async fn test_create_session_without_title() {
        let response = test_app()
            .oneshot(post_json("/api/chat/sessions", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["title"].is_null());
    }

    #[tokio::test]
    async fn test_history_seeds_greeting() {
        let app = test_app();
        let id = create_session(&app).await;

        let path = format!("/api/chat/sessions/{id}/messages");
        let response = app.clone().oneshot(get(&path)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let messages = json.as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "assistant");
        assert_eq!(messages[0]["content"], GREETING);

        // Seeding is idempotent.
        let response = app.clone().oneshot(get(&path)).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_history_unknown_session_is_404() {
        let response = test_app()
            .oneshot(get(
                "/api/chat/sessions/00000000-0000-7000-8000-000000000000/messages",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["errors"][0]["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_history_malformed_id_is_400() {
        let response = test_app()
            .oneshot(get("/api/chat/sessions/not-a-uuid/messages"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_message_empty_content_is_400() {
        let app = test_app();
        let id = create_session(&app).await;

        let path = format!("/api/chat/sessions/{id}/messages");
        let response = app
            .clone()
            .oneshot(post_json(&path, r#"{"content":"  "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["errors"][0]["code"], "VALIDATION_ERROR");

        // Nothing was stored: the next read seeds only the greeting.
        let response = app.clone().oneshot(get(&path)).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_post_message_missing_content_is_400() {
        let app = test_app();
        let id = create_session(&app).await;

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/api/chat/sessions/{id}/messages"),
                "{}",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_message_unknown_session_is_404() {
        let response = test_app()
            .oneshot(post_json(
                "/api/chat/sessions/00000000-0000-7000-8000-000000000000/messages",
                r#"{"content":"hi"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_message_unconfigured_upstream() {
        let app = test_app();
        let id = create_session(&app).await;

        let path = format!("/api/chat/sessions/{id}/messages");
        let response = app
            .clone()
            .oneshot(post_json(&path, r#"{"content":"hi"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], REPLY_NOT_CONFIGURED);
        assert_eq!(json["session_id"], id.as_str());

        // Both turns persisted: the user message and the failure reply.
        let response = app.clone().oneshot(get(&path)).await.unwrap();
        let json = body_json(response).await;
        let messages = json.as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "hi");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["content"], REPLY_NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn test_delete_session_then_history_is_404() {
        let app = test_app();
        let id = create_session(&app).await;

        let response = app
            .clone()
            .oneshot(del(&format!("/api/chat/sessions/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(get(&format!("/api/chat/sessions/{id}/messages")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_unknown_session_is_404() {
        let response = test_app()
            .oneshot(del(
                "/api/chat/sessions/00000000-0000-7000-8000-000000000000",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_api_path_is_structured_404() {
        let response = test_app().oneshot(get("/api/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["errors"][0]["code"], "NOT_FOUND");
    }
}
