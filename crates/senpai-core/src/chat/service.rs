//! Chat service orchestrating session lifecycle and message persistence.
//!
//! ChatService coordinates between the ChatStore and the AssistantClient
//! to manage the full conversation lifecycle: creating sessions, seeding
//! the greeting, appending messages, and deleting sessions. Stateless
//! across calls except through the store.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use senpai_types::chat::{ChatMessage, ChatReply, ChatSession, MessageRole};
use senpai_types::error::{ChatError, RepositoryError};
use senpai_types::user::{User, UserUpsert};

use crate::chat::store::ChatStore;
use crate::llm::assistant::AssistantClient;
use crate::llm::provider::CompletionBackend;

/// Synthetic first assistant message seeded into any session read with no
/// prior messages.
pub const GREETING: &str = "Konnichiwa! I'm Senpai, your anime and manga companion. Ask me \
about any series, character, studio, or season -- what shall we talk about today?";

/// Orchestrates chat session lifecycle and message persistence.
///
/// Generic over `ChatStore` and `CompletionBackend` to maintain clean
/// architecture (senpai-core never depends on senpai-infra).
pub struct ChatService<S: ChatStore, P: CompletionBackend> {
    store: S,
    assistant: AssistantClient<P>,
}

impl<S: ChatStore, P: CompletionBackend> ChatService<S, P> {
    /// Create a new chat service with the given store and assistant client.
    pub fn new(store: S, assistant: AssistantClient<P>) -> Self {
        Self { store, assistant }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Access the assistant client.
    pub fn assistant(&self) -> &AssistantClient<P> {
        &self.assistant
    }

    // --- User ---

    /// The default user, created lazily via idempotent upsert.
    pub async fn current_user(&self) -> Result<User, ChatError> {
        let user = self.store.upsert_user(&UserUpsert::default_user()).await?;
        Ok(user)
    }

    // --- Session lifecycle ---

    /// Create a new chat session for the default user.
    ///
    /// Ensures the owning user exists first, so the store's referential
    /// check never trips in normal operation.
    pub async fn create_session(&self, title: Option<String>) -> Result<ChatSession, ChatError> {
        let user = self.current_user().await?;
        let session = ChatSession::new(user.id, title);
        let created = self.store.create_session(&session).await?;
        info!(session_id = %created.id, "chat session created");
        Ok(created)
    }

    /// List sessions for a user, most recent first. Empty is valid.
    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<ChatSession>, ChatError> {
        let sessions = self.store.list_sessions(user_id).await?;
        Ok(sessions)
    }

    /// Delete a session and all of its messages.
    pub async fn delete_session(&self, session_id: &Uuid) -> Result<(), ChatError> {
        match self.store.delete_session(session_id).await {
            Ok(()) => {
                info!(session_id = %session_id, "chat session deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(ChatError::SessionNotFound),
            Err(err) => Err(err.into()),
        }
    }

    // --- Messages ---

    /// Get a session's messages, seeding the greeting on first read.
    ///
    /// A session with zero persisted messages gets exactly one synthetic
    /// assistant greeting, written once so later reads return the same
    /// message instead of duplicating it.
    pub async fn history(&self, session_id: &Uuid) -> Result<Vec<ChatMessage>, ChatError> {
        self.require_session(session_id).await?;

        let messages = self.store.get_messages(session_id).await?;
        if !messages.is_empty() {
            return Ok(messages);
        }

        let greeting = ChatMessage::new(*session_id, MessageRole::Assistant, GREETING);
        self.store.save_message(&greeting).await?;
        debug!(session_id = %session_id, "seeded greeting message");
        Ok(vec![greeting])
    }

    /// Append a user message and produce the assistant's reply.
    ///
    /// The user message is persisted before the upstream call so it
    /// survives an AI failure; whatever string the assistant client
    /// returns -- success text or a mapped failure string -- is stored as
    /// an ordinary assistant turn.
    pub async fn post_message(
        &self,
        session_id: &Uuid,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<ChatReply, ChatError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::Validation(
                "message content is required".to_string(),
            ));
        }

        self.require_session(session_id).await?;

        let user_message = ChatMessage::new(*session_id, MessageRole::User, content);
        self.store.save_message(&user_message).await?;

        let history = self.store.get_messages(session_id).await?;
        let reply_text = self.assistant.reply(&history, cancel).await;

        let assistant_message =
            ChatMessage::new(*session_id, MessageRole::Assistant, reply_text.clone());
        self.store.save_message(&assistant_message).await?;

        Ok(ChatReply {
            message: reply_text,
            session_id: *session_id,
        })
    }

    /// Fail with `SessionNotFound` unless the session exists.
    async fn require_session(&self, session_id: &Uuid) -> Result<ChatSession, ChatError> {
        self.store
            .get_session(session_id)
            .await?
            .ok_or(ChatError::SessionNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::Utc;
    use senpai_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

    use crate::llm::assistant::{
        HISTORY_WINDOW, REPLY_AUTH, REPLY_NOT_CONFIGURED, REPLY_TIMEOUT,
    };

    // --- In-test store ---

    #[derive(Default)]
    struct MemStore {
        users: Mutex<HashMap<String, User>>,
        sessions: Mutex<HashMap<Uuid, ChatSession>>,
        messages: Mutex<HashMap<Uuid, Vec<ChatMessage>>>,
    }

    impl ChatStore for MemStore {
        async fn get_user(&self, id: &str) -> Result<Option<User>, RepositoryError> {
            Ok(self.users.lock().unwrap().get(id).cloned())
        }

        async fn upsert_user(&self, fields: &UserUpsert) -> Result<User, RepositoryError> {
            let mut users = self.users.lock().unwrap();
            let now = Utc::now();
            let user = users
                .entry(fields.id.clone())
                .and_modify(|u| {
                    u.email = fields.email.clone();
                    u.first_name = fields.first_name.clone();
                    u.last_name = fields.last_name.clone();
                    u.updated_at = now;
                })
                .or_insert_with(|| User {
                    id: fields.id.clone(),
                    email: fields.email.clone(),
                    first_name: fields.first_name.clone(),
                    last_name: fields.last_name.clone(),
                    created_at: now,
                    updated_at: now,
                });
            Ok(user.clone())
        }

        async fn create_session(
            &self,
            session: &ChatSession,
        ) -> Result<ChatSession, RepositoryError> {
            if !self.users.lock().unwrap().contains_key(&session.user_id) {
                return Err(RepositoryError::Conflict(format!(
                    "user '{}' does not exist",
                    session.user_id
                )));
            }
            self.sessions
                .lock()
                .unwrap()
                .insert(session.id, session.clone());
            Ok(session.clone())
        }

        async fn get_session(
            &self,
            session_id: &Uuid,
        ) -> Result<Option<ChatSession>, RepositoryError> {
            Ok(self.sessions.lock().unwrap().get(session_id).cloned())
        }

        async fn list_sessions(
            &self,
            user_id: &str,
        ) -> Result<Vec<ChatSession>, RepositoryError> {
            let mut sessions: Vec<ChatSession> = self
                .sessions
                .lock()
                .unwrap()
                .values()
                .filter(|s| s.user_id == user_id)
                .cloned()
                .collect();
            sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            Ok(sessions)
        }

        async fn get_messages(
            &self,
            session_id: &Uuid,
        ) -> Result<Vec<ChatMessage>, RepositoryError> {
            Ok(self
                .messages
                .lock()
                .unwrap()
                .get(session_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
            self.messages
                .lock()
                .unwrap()
                .entry(message.session_id)
                .or_default()
                .push(message.clone());
            Ok(())
        }

        async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
            if self.sessions.lock().unwrap().remove(session_id).is_none() {
                return Err(RepositoryError::NotFound);
            }
            self.messages.lock().unwrap().remove(session_id);
            Ok(())
        }
    }

    // --- In-test backend ---

    enum MockBehavior {
        Succeed(String),
        Fail(fn() -> LlmError),
        Hang,
    }

    struct MockBackend {
        behavior: MockBehavior,
        last_request: Mutex<Option<CompletionRequest>>,
    }

    impl MockBackend {
        fn succeeding(content: &str) -> Self {
            Self {
                behavior: MockBehavior::Succeed(content.to_string()),
                last_request: Mutex::new(None),
            }
        }
    }

    impl CompletionBackend for MockBackend {
        fn name(&self) -> &str {
            "mock"
        }

        fn complete(
            &self,
            request: &CompletionRequest,
        ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
            *self.last_request.lock().unwrap() = Some(request.clone());
            let outcome = match &self.behavior {
                MockBehavior::Succeed(content) => Some(Ok(CompletionResponse {
                    id: "resp-1".to_string(),
                    model: request.model.clone(),
                    content: content.clone(),
                    usage: Usage::default(),
                })),
                MockBehavior::Fail(make_err) => Some(Err(make_err())),
                MockBehavior::Hang => None,
            };
            async move {
                match outcome {
                    Some(result) => result,
                    None => std::future::pending().await,
                }
            }
        }
    }

    // Delegating impl so tests can hold a handle to the mock while the
    // assistant client owns it.
    impl CompletionBackend for std::sync::Arc<MockBackend> {
        fn name(&self) -> &str {
            MockBackend::name(self)
        }

        fn complete(
            &self,
            request: &CompletionRequest,
        ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
            MockBackend::complete(self, request)
        }
    }

    fn service_with(backend: Option<MockBackend>) -> ChatService<MemStore, MockBackend> {
        let assistant =
            AssistantClient::new(backend, "sonar".to_string(), Duration::from_millis(200));
        ChatService::new(MemStore::default(), assistant)
    }

    #[tokio::test]
    async fn test_current_user_is_idempotent() {
        let service = service_with(None);
        let first = service.current_user().await.unwrap();
        let second = service.current_user().await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
    }

    #[tokio::test]
    async fn test_create_and_list_sessions() {
        let service = service_with(None);
        let session = service
            .create_session(Some("Spring season".to_string()))
            .await
            .unwrap();
        assert_eq!(session.title.as_deref(), Some("Spring season"));

        let user = service.current_user().await.unwrap();
        let sessions = service.list_sessions(&user.id).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, session.id);
    }

    #[tokio::test]
    async fn test_list_sessions_empty_is_ok() {
        let service = service_with(None);
        let sessions = service.list_sessions("nobody").await.unwrap();
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn test_history_seeds_greeting_once() {
        let service = service_with(None);
        let session = service.create_session(None).await.unwrap();

        let first = service.history(&session.id).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].role, MessageRole::Assistant);
        assert_eq!(first[0].content, GREETING);

        // Second read returns the same single message, not a duplicate.
        let second = service.history(&session.id).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, first[0].id);
    }

    #[tokio::test]
    async fn test_history_missing_session_is_not_found() {
        let service = service_with(None);
        let err = service.history(&Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, ChatError::SessionNotFound));
    }

    #[tokio::test]
    async fn test_post_empty_content_never_reaches_storage() {
        let service = service_with(None);
        let session = service.create_session(None).await.unwrap();

        let err = service
            .post_message(&session.id, "   ", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));

        let stored = service.store().get_messages(&session.id).await.unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_post_to_missing_session_is_not_found() {
        let service = service_with(None);
        let err = service
            .post_message(&Uuid::now_v7(), "hi", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::SessionNotFound));
    }

    #[tokio::test]
    async fn test_post_message_success_roundtrip() {
        let service = service_with(Some(MockBackend::succeeding("Hello! Big fan of mecha?")));
        let session = service.create_session(None).await.unwrap();

        let reply = service
            .post_message(&session.id, "hi", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(reply.message, "Hello! Big fan of mecha?");
        assert_eq!(reply.session_id, session.id);

        let history = service.store().get_messages(&session.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[0].content, "hi");
        assert_eq!(history[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_post_message_unconfigured_stores_fixed_reply() {
        let service = service_with(None);
        let session = service.create_session(None).await.unwrap();

        let reply = service
            .post_message(&session.id, "hi", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(reply.message, REPLY_NOT_CONFIGURED);

        let history = service.store().get_messages(&session.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content, REPLY_NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn test_post_message_auth_failure_stores_auth_reply() {
        let backend = MockBackend {
            behavior: MockBehavior::Fail(|| LlmError::AuthenticationFailed),
            last_request: Mutex::new(None),
        };
        let service = service_with(Some(backend));
        let session = service.create_session(None).await.unwrap();

        let reply = service
            .post_message(&session.id, "hi", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(reply.message, REPLY_AUTH);
    }

    #[tokio::test]
    async fn test_post_message_timeout_stores_timeout_reply() {
        let backend = MockBackend {
            behavior: MockBehavior::Hang,
            last_request: Mutex::new(None),
        };
        let service = service_with(Some(backend));
        let session = service.create_session(None).await.unwrap();

        let start = std::time::Instant::now();
        let reply = service
            .post_message(&session.id, "hi", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(reply.message, REPLY_TIMEOUT);
        assert!(start.elapsed() < Duration::from_secs(2));

        // The user message survived the upstream failure.
        let history = service.store().get_messages(&session.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "hi");
        assert_eq!(history[1].content, REPLY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_upstream_request_is_windowed() {
        // An Arc handle keeps the mock inspectable after the assistant
        // client takes ownership of the backend.
        let backend = std::sync::Arc::new(MockBackend::succeeding("ok"));
        let assistant = AssistantClient::new(
            Some(backend.clone()),
            "sonar".to_string(),
            Duration::from_millis(200),
        );
        let service = ChatService::new(MemStore::default(), assistant);
        let session = service.create_session(None).await.unwrap();

        // Preload more history than the window holds.
        for i in 0..(HISTORY_WINDOW + 4) {
            let role = if i % 2 == 0 {
                MessageRole::User
            } else {
                MessageRole::Assistant
            };
            let msg = ChatMessage::new(session.id, role, format!("turn {i}"));
            service.store().save_message(&msg).await.unwrap();
        }

        service
            .post_message(&session.id, "latest question", &CancellationToken::new())
            .await
            .unwrap();

        let captured = backend.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(captured.messages.len(), HISTORY_WINDOW);
        assert_eq!(
            captured.messages.last().unwrap().content,
            "latest question"
        );
    }

    #[tokio::test]
    async fn test_delete_session_cascades() {
        let service = service_with(None);
        let session = service.create_session(None).await.unwrap();
        service.history(&session.id).await.unwrap();

        service.delete_session(&session.id).await.unwrap();

        let err = service.history(&session.id).await.unwrap_err();
        assert!(matches!(err, ChatError::SessionNotFound));
    }

    #[tokio::test]
    async fn test_delete_missing_session_is_not_found() {
        let service = service_with(None);
        let err = service.delete_session(&Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, ChatError::SessionNotFound));
    }
}
