//! Assistant client: bounded history in, one displayable reply out.
//!
//! Wraps a [`CompletionBackend`] and owns everything the rest of the
//! system should not care about: the persona prompt, the trailing history
//! window, fixed sampling parameters, the hard deadline with cancellation,
//! and the mapping from every upstream failure mode to a fixed
//! user-facing reply. `reply()` never returns an error -- the chat
//! conversation itself is the error channel, so failure strings are
//! ordinary assistant turns.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use senpai_types::chat::ChatMessage;
use senpai_types::llm::{CompletionRequest, LlmError, Turn};

use crate::llm::provider::CompletionBackend;

/// Number of trailing history messages included in each upstream request.
///
/// The primary deployment's bound; the request carries this window plus
/// the system prompt, never the full transcript.
pub const HISTORY_WINDOW: usize = 10;

/// System instruction establishing the assistant persona.
pub const SYSTEM_PROMPT: &str = "You are Senpai, a specialized assistant for anime and manga \
discussion. You know series, characters, studios, creators, seasons, and fandom culture in \
depth. Keep a friendly, enthusiastic tone. When the user greets you, always greet them back \
before anything else. Stay on topic: if asked about something unrelated, gently steer the \
conversation back to anime and manga.";

/// Reply when no upstream credential is configured.
pub const REPLY_NOT_CONFIGURED: &str = "Gomen! My connection to the anime knowledge base \
isn't set up yet. The server is missing its upstream API key -- ask the administrator to set \
PERPLEXITY_API_KEY and restart me.";

/// Reply when the upstream call exceeds the hard deadline.
pub const REPLY_TIMEOUT: &str = "Sorry, that one took too long to research and I had to give \
up on the request. Please ask me again -- I'll try to be quicker!";

/// Reply for 401 responses (bad key or exhausted credits).
pub const REPLY_AUTH: &str = "I couldn't authenticate with the anime knowledge base: the API \
key was rejected or the account has run out of credits. Please check the upstream account \
balance and key, then try again.";

/// Reply for 429 responses.
pub const REPLY_RATE_LIMITED: &str = "The anime knowledge base is rate-limiting us right \
now. Give me a few seconds to catch my breath and ask again!";

/// Reply for 400 responses (model/parameter mismatch).
pub const REPLY_BAD_REQUEST: &str = "The anime knowledge base rejected my request -- the \
configured model name or parameters look wrong. The server configuration may need updating.";

/// Reply for any other non-2xx response.
pub const REPLY_UNAVAILABLE: &str = "The anime knowledge base is unavailable right now. \
Please try again in a moment.";

/// Reply when no response arrives at all.
pub const REPLY_OFFLINE: &str = "I couldn't reach the anime knowledge base at all -- there \
may be a network problem on the server. Please try again shortly.";

/// Reply for a 2xx response missing the completion text.
pub const REPLY_EMPTY: &str = "The anime knowledge base sent back an empty response. That's \
odd! Please try asking again.";

/// Turns conversation history into one deadline-guarded completion call.
pub struct AssistantClient<P> {
    /// `None` when no credential is configured; `reply()` then
    /// short-circuits before any network activity.
    backend: Option<P>,
    model: String,
    timeout: Duration,
}

impl<P: CompletionBackend> AssistantClient<P> {
    /// Create a new assistant client.
    pub fn new(backend: Option<P>, model: String, timeout: Duration) -> Self {
        Self {
            backend,
            model,
            timeout,
        }
    }

    /// Whether an upstream backend is configured.
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// The hard deadline applied to each upstream call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the completion request from the trailing history window.
    ///
    /// Sampling parameters are fixed; streaming and related-content
    /// features are disabled at the wire layer.
    pub fn build_request(&self, history: &[ChatMessage]) -> CompletionRequest {
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        let messages = history[start..]
            .iter()
            .map(|m| Turn {
                role: m.role,
                content: m.content.clone(),
            })
            .collect();

        CompletionRequest {
            model: self.model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            messages,
            temperature: 0.3,
            top_p: 0.9,
            presence_penalty: 0.0,
            frequency_penalty: 0.1,
        }
    }

    /// Produce the assistant's reply for the given history.
    ///
    /// Infallible from the caller's perspective: every failure path ends
    /// in a fixed displayable string. The call is bounded by the
    /// configured deadline; cancelling `cancel` drops the in-flight HTTP
    /// call and is reported the same way as the deadline.
    pub async fn reply(&self, history: &[ChatMessage], cancel: &CancellationToken) -> String {
        let Some(backend) = &self.backend else {
            return REPLY_NOT_CONFIGURED.to_string();
        };

        let request = self.build_request(history);

        tokio::select! {
            _ = cancel.cancelled() => {
                warn!(backend = backend.name(), "upstream call cancelled by caller");
                REPLY_TIMEOUT.to_string()
            }
            outcome = tokio::time::timeout(self.timeout, backend.complete(&request)) => {
                match outcome {
                    Err(_) => {
                        warn!(
                            backend = backend.name(),
                            timeout_secs = self.timeout.as_secs(),
                            "upstream call exceeded deadline"
                        );
                        REPLY_TIMEOUT.to_string()
                    }
                    Ok(Ok(response)) if response.content.trim().is_empty() => {
                        warn!(backend = backend.name(), "upstream returned empty completion");
                        REPLY_EMPTY.to_string()
                    }
                    Ok(Ok(response)) => response.content,
                    Ok(Err(err)) => {
                        warn!(backend = backend.name(), error = %err, "upstream call failed");
                        failure_reply(&err).to_string()
                    }
                }
            }
        }
    }
}

/// Map an upstream error to its fixed user-facing reply.
fn failure_reply(err: &LlmError) -> &'static str {
    match err {
        LlmError::AuthenticationFailed => REPLY_AUTH,
        LlmError::RateLimited => REPLY_RATE_LIMITED,
        LlmError::InvalidRequest(_) => REPLY_BAD_REQUEST,
        LlmError::Upstream { .. } => REPLY_UNAVAILABLE,
        LlmError::Network(_) => REPLY_OFFLINE,
        LlmError::EmptyResponse | LlmError::Deserialization(_) => REPLY_EMPTY,
    }
}
