use thiserror::Error;

/// Errors from storage operations (used by trait definitions in senpai-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Service-level errors for chat operations.
///
/// The route layer maps these to HTTP statuses: `Validation` -> 400,
/// `SessionNotFound` -> 404, `Storage` -> 500 (logged, generic body).
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("session not found")]
    SessionNotFound,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}
