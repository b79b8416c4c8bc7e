//! Perplexity chat-completions API types.
//!
//! These are provider-specific request/response structures used for HTTP
//! communication with the Perplexity API (OpenAI-compatible shape). They
//! are NOT the generic completion types from senpai-types -- those are
//! provider-agnostic.

use serde::{Deserialize, Serialize};

/// Request body for `POST /chat/completions`.
///
/// Streaming and related-content features are always disabled; the flags
/// are serialized explicitly so the intent is visible on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub temperature: f64,
    pub top_p: f64,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
    pub stream: bool,
    pub return_images: bool,
    pub return_related_questions: bool,
}

/// A single role-tagged message on the wire.
///
/// Role is a plain string here because the wire set ("system", "user",
/// "assistant") is wider than the domain's two-variant enum.
#[derive(Debug, Clone, Serialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

/// Response body for a non-streaming completion.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub model: String,
    #[serde(default)]
    pub choices: Vec<WireChoice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

/// One completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct WireChoice {
    pub message: WireChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The message object inside a choice.
#[derive(Debug, Clone, Deserialize)]
pub struct WireChoiceMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Token usage as reported by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct WireUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}
