//! Application configuration types.
//!
//! Deserialized from `{data_dir}/config.toml` by the infra layer. Every
//! field has a default so a missing or partial file still yields a working
//! configuration. The upstream API credential is NOT part of this file --
//! it comes from the environment and is handled separately (secrecy-wrapped
//! in the infra layer).

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Senpai backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub upstream: UpstreamConfig,
}

/// Configuration for the upstream completion API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Model identifier sent with every completion request.
    pub model: String,
    /// Base URL of the chat-completions endpoint.
    pub base_url: String,
    /// Hard deadline for one upstream call, in seconds.
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    /// Default upstream model.
    pub const DEFAULT_MODEL: &'static str = "sonar";
    /// Default upstream base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.perplexity.ai";
    /// Default hard timeout for one completion call.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }
}
