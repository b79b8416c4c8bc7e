//! Configuration loading for Senpai.
//!
//! Reads `config.toml` from the data directory (`~/.senpai/` in production)
//! and deserializes it into [`AppConfig`]. Falls back to defaults when the
//! file is missing or malformed. The upstream credential comes from the
//! environment only and is wrapped in `SecretString` immediately so it
//! never lands in Debug output or logs.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use senpai_types::config::AppConfig;

/// Environment variable holding the upstream API credential.
pub const API_KEY_ENV: &str = "PERPLEXITY_API_KEY";

/// Resolve the data directory: `SENPAI_DATA_DIR` env var, falling back to
/// `~/.senpai`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SENPAI_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".senpai")
}

/// Load application configuration from `{data_dir}/config.toml`.
///
/// - Missing file: returns [`AppConfig::default()`].
/// - Unreadable or malformed file: logs a warning and returns the default.
pub async fn load_app_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No config.toml found at {}, using defaults",
                config_path.display()
            );
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!(
                "Failed to read {}: {err}, using defaults",
                config_path.display()
            );
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Read the upstream API credential from the environment.
///
/// `None` when unset or empty -- the caller degrades to the
/// not-configured assistant reply instead of failing startup.
pub fn upstream_api_key() -> Option<SecretString> {
    match std::env::var(API_KEY_ENV) {
        Ok(value) if !value.trim().is_empty() => Some(SecretString::from(value)),
        _ => None,
    }
}
