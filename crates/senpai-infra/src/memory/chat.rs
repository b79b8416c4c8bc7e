//! In-memory chat store implementation.
//!
//! Implements `ChatStore` on top of dashmap for the serverless deployment
//! variant: state lives for the lifetime of the serving process and is not
//! durable across restarts. Dashmap's per-shard locking keeps concurrent
//! requests from corrupting state; message lists are append-only vectors
//! keyed by session.
//!
//! Contract parity with `SqliteChatStore` is deliberate -- including the
//! referential check on `create_session`.

use dashmap::DashMap;
use chrono::Utc;
use uuid::Uuid;

use senpai_core::chat::store::ChatStore;
use senpai_types::chat::{ChatMessage, ChatSession};
use senpai_types::error::RepositoryError;
use senpai_types::user::{User, UserUpsert};

/// Process-local implementation of `ChatStore`.
#[derive(Default)]
pub struct MemoryChatStore {
    users: DashMap<String, User>,
    sessions: DashMap<Uuid, ChatSession>,
    messages: DashMap<Uuid, Vec<ChatMessage>>,
}

impl MemoryChatStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChatStore for MemoryChatStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.get(id).map(|u| u.value().clone()))
    }

    async fn upsert_user(&self, fields: &UserUpsert) -> Result<User, RepositoryError> {
        let now = Utc::now();
        let mut entry = self
            .users
            .entry(fields.id.clone())
            .or_insert_with(|| User {
                id: fields.id.clone(),
                email: fields.email.clone(),
                first_name: fields.first_name.clone(),
                last_name: fields.last_name.clone(),
                created_at: now,
                updated_at: now,
            });
        // Apply mutable fields on the update path too; created_at is kept.
        entry.email = fields.email.clone();
        entry.first_name = fields.first_name.clone();
        entry.last_name = fields.last_name.clone();
        entry.updated_at = now;
        Ok(entry.value().clone())
    }

    async fn create_session(
        &self,
        session: &ChatSession,
    ) -> Result<ChatSession, RepositoryError> {
        if !self.users.contains_key(&session.user_id) {
            return Err(RepositoryError::Conflict(format!(
                "user '{}' does not exist",
                session.user_id
            )));
        }
        self.sessions.insert(session.id, session.clone());
        Ok(session.clone())
    }

    async fn get_session(
        &self,
        session_id: &Uuid,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        Ok(self.sessions.get(session_id).map(|s| s.value().clone()))
    }

    async fn list_sessions(&self, user_id: &str) -> Result<Vec<ChatSession>, RepositoryError> {
        let mut sessions: Vec<ChatSession> = self
            .sessions
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
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
            .get(session_id)
            .map(|m| m.value().clone())
            .unwrap_or_default())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        self.messages
            .entry(message.session_id)
            .or_default()
            .push(message.clone());

        if let Some(mut session) = self.sessions.get_mut(&message.session_id) {
            session.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        if self.sessions.remove(session_id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        self.messages.remove(session_id);
        Ok(())
    }
}
