//! ChatStore trait definition and its object-safe boxed wrapper.
//!
//! One contract, two implementations in senpai-infra: `SqliteChatStore`
//! (durable, WAL-mode SQLite) and `MemoryChatStore` (process-local map for
//! the serverless deployment). Uses native async fn in traits (RPITIT,
//! Rust 2024 edition); `BoxChatStore` provides dynamic dispatch so the
//! application can select a backend at startup.

use std::future::Future;
use std::pin::Pin;

use senpai_types::chat::{ChatMessage, ChatSession};
use senpai_types::error::RepositoryError;
use senpai_types::user::{User, UserUpsert};
use uuid::Uuid;

/// Storage contract for user, session, and message persistence.
///
/// Side effects are confined to the backing store; no network I/O happens
/// behind this trait. Both backends validate that `create_session`
/// references an existing user and fail with `RepositoryError::Conflict`
/// otherwise.
pub trait ChatStore: Send + Sync {
    /// Look up a user by its opaque identifier.
    fn get_user(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Create the user if absent, otherwise update its mutable fields.
    ///
    /// Idempotent on repeated calls with identical input.
    fn upsert_user(
        &self,
        fields: &UserUpsert,
    ) -> impl Future<Output = Result<User, RepositoryError>> + Send;

    /// Persist a new chat session.
    ///
    /// Fails with `RepositoryError::Conflict` when `session.user_id` does
    /// not reference an existing user.
    fn create_session(
        &self,
        session: &ChatSession,
    ) -> impl Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Get a chat session by its unique ID.
    fn get_session(
        &self,
        session_id: &Uuid,
    ) -> impl Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// List sessions for a user, most recent first (updated_at DESC).
    fn list_sessions(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send;

    /// Get messages for a session in chronological order.
    fn get_messages(
        &self,
        session_id: &Uuid,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Append a message to its session and bump the session's updated_at.
    fn save_message(
        &self,
        message: &ChatMessage,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a session and all of its messages.
    ///
    /// Fails with `RepositoryError::NotFound` when the session is absent.
    fn delete_session(
        &self,
        session_id: &Uuid,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Object-safe version of [`ChatStore`] with boxed futures.
///
/// This trait exists solely to enable dynamic dispatch (`dyn ChatStoreDyn`).
/// A blanket implementation is provided for all types implementing
/// `ChatStore`.
pub trait ChatStoreDyn: Send + Sync {
    fn get_user_boxed<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<User>, RepositoryError>> + Send + 'a>>;

    fn upsert_user_boxed<'a>(
        &'a self,
        fields: &'a UserUpsert,
    ) -> Pin<Box<dyn Future<Output = Result<User, RepositoryError>> + Send + 'a>>;

    fn create_session_boxed<'a>(
        &'a self,
        session: &'a ChatSession,
    ) -> Pin<Box<dyn Future<Output = Result<ChatSession, RepositoryError>> + Send + 'a>>;

    fn get_session_boxed<'a>(
        &'a self,
        session_id: &'a Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send + 'a>>;

    fn list_sessions_boxed<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send + 'a>>;

    fn get_messages_boxed<'a>(
        &'a self,
        session_id: &'a Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send + 'a>>;

    fn save_message_boxed<'a>(
        &'a self,
        message: &'a ChatMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send + 'a>>;

    fn delete_session_boxed<'a>(
        &'a self,
        session_id: &'a Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send + 'a>>;
}

/// Blanket implementation: any `ChatStore` automatically implements
/// `ChatStoreDyn`.
impl<T: ChatStore> ChatStoreDyn for T {
    fn get_user_boxed<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<User>, RepositoryError>> + Send + 'a>> {
        Box::pin(self.get_user(id))
    }

    fn upsert_user_boxed<'a>(
        &'a self,
        fields: &'a UserUpsert,
    ) -> Pin<Box<dyn Future<Output = Result<User, RepositoryError>> + Send + 'a>> {
        Box::pin(self.upsert_user(fields))
    }

    fn create_session_boxed<'a>(
        &'a self,
        session: &'a ChatSession,
    ) -> Pin<Box<dyn Future<Output = Result<ChatSession, RepositoryError>> + Send + 'a>> {
        Box::pin(self.create_session(session))
    }

    fn get_session_boxed<'a>(
        &'a self,
        session_id: &'a Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send + 'a>>
    {
        Box::pin(self.get_session(session_id))
    }

    fn list_sessions_boxed<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send + 'a>> {
        Box::pin(self.list_sessions(user_id))
    }

    fn get_messages_boxed<'a>(
        &'a self,
        session_id: &'a Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send + 'a>> {
        Box::pin(self.get_messages(session_id))
    }

    fn save_message_boxed<'a>(
        &'a self,
        message: &'a ChatMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send + 'a>> {
        Box::pin(self.save_message(message))
    }

    fn delete_session_boxed<'a>(
        &'a self,
        session_id: &'a Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send + 'a>> {
        Box::pin(self.delete_session(session_id))
    }
}

/// Type-erased chat store for runtime backend selection.
///
/// Wraps any `ChatStore` implementation behind dynamic dispatch, enabling
/// the binary to pick SQLite or the in-memory map at startup while the
/// service stays generic over a single concrete type.
pub struct BoxChatStore {
    inner: Box<dyn ChatStoreDyn>,
}

impl BoxChatStore {
    /// Wrap a concrete store behind dynamic dispatch.
    pub fn new<S: ChatStore + 'static>(store: S) -> Self {
        Self {
            inner: Box::new(store),
        }
    }
}

impl ChatStore for BoxChatStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        self.inner.get_user_boxed(id).await
    }

    async fn upsert_user(&self, fields: &UserUpsert) -> Result<User, RepositoryError> {
        self.inner.upsert_user_boxed(fields).await
    }

    async fn create_session(
        &self,
        session: &ChatSession,
    ) -> Result<ChatSession, RepositoryError> {
        self.inner.create_session_boxed(session).await
    }

    async fn get_session(
        &self,
        session_id: &Uuid,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        self.inner.get_session_boxed(session_id).await
    }

    async fn list_sessions(&self, user_id: &str) -> Result<Vec<ChatSession>, RepositoryError> {
        self.inner.list_sessions_boxed(user_id).await
    }

    async fn get_messages(
        &self,
        session_id: &Uuid,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        self.inner.get_messages_boxed(session_id).await
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        self.inner.save_message_boxed(message).await
    }

    async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        self.inner.delete_session_boxed(session_id).await
    }
}
