//! User types for Senpai.
//!
//! Authentication is explicitly absent from this deployment: every
//! conversation belongs to one fixed default user, created lazily on
//! first touch via an idempotent upsert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the fixed default user in the no-auth deployment.
pub const DEFAULT_USER_ID: &str = "local-user";

/// An account owning chat sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque identifier (not a UUID -- the default user has a fixed id).
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable fields accepted by the upsert operation.
///
/// Repeated upserts with identical input are idempotent: the first call
/// creates the row, later calls overwrite the same mutable fields and
/// refresh `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpsert {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserUpsert {
    /// The fixed default user for the no-auth deployment.
    pub fn default_user() -> Self {
        Self {
            id: DEFAULT_USER_ID.to_string(),
            email: Some("otaku@senpai.local".to_string()),
            first_name: Some("Anime".to_string()),
            last_name: Some("Fan".to_string()),
        }
    }
}
