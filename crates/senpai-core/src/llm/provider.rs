//! CompletionBackend trait definition.
//!
//! The abstraction the upstream completion provider implements. Uses
//! native async fn in traits (RPITIT, Rust 2024 edition). The single
//! implementation lives in senpai-infra (`PerplexityProvider`); tests use
//! in-module mocks.

use std::future::Future;

use senpai_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Backend for non-streaming chat completions.
pub trait CompletionBackend: Send + Sync {
    /// Human-readable backend name (e.g., "perplexity").
    fn name(&self) -> &str;

    /// Send one completion request and receive the full response.
    ///
    /// No retries happen at this layer or above: one request produces at
    /// most one upstream attempt.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
