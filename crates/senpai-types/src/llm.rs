//! Upstream completion API types for Senpai.
//!
//! These types model the provider-agnostic request/response shapes used by
//! the assistant client. Provider-specific wire structures live in
//! senpai-infra.

use serde::{Deserialize, Serialize};

use crate::chat::MessageRole;

/// A single role-tagged turn sent to the completion API.
///
/// The system instruction travels separately in [`CompletionRequest::system`];
/// conversation turns only ever carry the two domain roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: MessageRole,
    pub content: String,
}

/// Request to the upstream completion API.
///
/// Sampling parameters are fixed by the assistant client, not by callers:
/// streaming and related-content features stay disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub messages: Vec<Turn>,
    pub temperature: f64,
    pub top_p: f64,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
}

/// Non-streaming response from the upstream completion API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub model: String,
    pub content: String,
    pub usage: Usage,
}

/// Token usage reported by the upstream API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Errors from upstream completion calls.
///
/// Each variant corresponds to one user-displayable failure message in the
/// assistant client; none of them escape past it.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("upstream error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("empty completion in response")]
    EmptyResponse,

    #[error("deserialization error: {0}")]
    Deserialization(String),
}
