//! PerplexityProvider -- concrete [`CompletionBackend`] for the Perplexity
//! chat-completions API.
//!
//! Sends non-streaming requests to `POST {base_url}/chat/completions` with
//! bearer authentication and maps HTTP-level failures onto [`LlmError`]
//! variants by status code. Never retries; the assistant client in
//! senpai-core owns the deadline and the user-facing failure strings.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

pub mod types;

use secrecy::{ExposeSecret, SecretString};

use senpai_core::llm::provider::CompletionBackend;
use senpai_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use self::types::{ChatCompletionRequest, ChatCompletionResponse, WireMessage};

/// Perplexity completion provider.
pub struct PerplexityProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl PerplexityProvider {
    /// Default base URL for the Perplexity API.
    const DEFAULT_BASE_URL: &'static str = "https://api.perplexity.ai";

    /// Create a new provider with the given API key.
    pub fn new(api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Convert a generic [`CompletionRequest`] into the wire shape.
    ///
    /// The system instruction becomes the leading "system" message;
    /// conversation turns follow in order with their domain roles.
    fn to_wire_request(request: &CompletionRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(WireMessage {
            role: "system".to_string(),
            content: request.system.clone(),
        });
        for turn in &request.messages {
            messages.push(WireMessage {
                role: turn.role.to_string(),
                content: turn.content.clone(),
            });
        }

        ChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            top_p: request.top_p,
            presence_penalty: request.presence_penalty,
            frequency_penalty: request.frequency_penalty,
            stream: false,
            return_images: false,
            return_related_questions: false,
        }
    }
}

// PerplexityProvider intentionally does NOT derive Debug to prevent
// accidental exposure of internal state including the API key.

impl CompletionBackend for PerplexityProvider {
    fn name(&self) -> &str {
        "perplexity"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = Self::to_wire_request(request);

        let response = self
            .client
            .post(self.url())
            .bearer_auth(self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            // No response at all: DNS, refused connection, reset mid-flight.
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited,
                400 => LlmError::InvalidRequest(error_body),
                code => LlmError::Upstream {
                    status: code,
                    message: error_body,
                },
            });
        }

        let wire: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        let content = wire
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        let usage = wire
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: wire.id,
            model: wire.model,
            content,
            usage,
        })
    }
}
