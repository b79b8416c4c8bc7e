//! Application state wiring the service to concrete backends.
//!
//! The chat service is generic over store and completion backend; AppState
//! pins it to `BoxChatStore` (so the storage backend is chosen at startup:
//! SQLite for the durable deployment, the in-memory map for the serverless
//! one) and `PerplexityProvider`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use senpai_core::chat::service::ChatService;
use senpai_core::chat::store::BoxChatStore;
use senpai_core::llm::assistant::AssistantClient;
use senpai_infra::config::{load_app_config, upstream_api_key};
use senpai_infra::llm::perplexity::PerplexityProvider;
use senpai_infra::memory::chat::MemoryChatStore;
use senpai_infra::sqlite::chat::SqliteChatStore;
use senpai_infra::sqlite::pool::DatabasePool;

/// Concrete chat service type used by the HTTP handlers.
pub type AppChatService = ChatService<BoxChatStore, PerplexityProvider>;

/// Shared application state holding the wired service.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<AppChatService>,
}

impl AppState {
    /// Initialize the application state: pick a storage backend, load
    /// configuration, and wire the service.
    ///
    /// A missing upstream credential is not an error -- the assistant
    /// degrades to its not-configured reply.
    pub async fn init(data_dir: &Path, in_memory: bool) -> anyhow::Result<Self> {
        let config = load_app_config(data_dir).await;

        let store = if in_memory {
            tracing::info!("using in-memory store (state is not durable)");
            BoxChatStore::new(MemoryChatStore::new())
        } else {
            tokio::fs::create_dir_all(data_dir).await?;
            let db_url = format!(
                "sqlite://{}?mode=rwc",
                data_dir.join("senpai.db").display()
            );
            let pool = DatabasePool::new(&db_url).await?;
            BoxChatStore::new(SqliteChatStore::new(pool))
        };

        let backend = upstream_api_key().map(|key| {
            PerplexityProvider::new(key).with_base_url(config.upstream.base_url.clone())
        });
        if backend.is_none() {
            tracing::warn!(
                "no upstream API key configured; assistant replies will report the missing credential"
            );
        }

        let assistant = AssistantClient::new(
            backend,
            config.upstream.model.clone(),
            Duration::from_secs(config.upstream.timeout_secs),
        );

        Ok(Self::from_parts(store, assistant))
    }

    /// Wire a state from already-constructed parts (used by tests).
    pub fn from_parts(
        store: BoxChatStore,
        assistant: AssistantClient<PerplexityProvider>,
    ) -> Self {
        Self {
            chat_service: Arc::new(ChatService::new(store, assistant)),
        }
    }
}
