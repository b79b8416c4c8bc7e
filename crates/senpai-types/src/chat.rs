//! Chat session and message types for Senpai.
//!
//! These types model a conversation thread: sessions owned by a user,
//! and the ordered messages within a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Author of a chat message.
///
/// Closed two-variant set, matching the CHECK constraint in the SQLite
/// schema: `CHECK (role IN ('user', 'assistant'))`. Any other value read
/// back from storage is a data-integrity violation and fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single ongoing conversation thread.
///
/// Sessions exist independently of their messages: a freshly created
/// session has none until the first read seeds the greeting. Deleting a
/// session cascades to its messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create a new session owned by `user_id` with a fresh v7 id.
    pub fn new(user_id: impl Into<String>, title: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id: user_id.into(),
            title,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single message within a chat session.
///
/// Messages are ordered by `created_at` within a session; the order is
/// significant for conversation context. Messages are immutable after
/// creation and only removed via session-delete cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new message with a fresh v7 id, timestamped now.
    pub fn new(session_id: Uuid, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            session_id,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Outcome of posting a user message: the assistant's reply text plus the
/// session it landed in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    pub session_id: Uuid,
}
