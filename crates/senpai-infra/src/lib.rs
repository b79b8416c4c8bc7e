//! Infrastructure layer for Senpai.
//!
//! Contains implementations of the traits defined in `senpai-core`:
//! SQLite storage (WAL, split reader/writer pools), the process-local
//! in-memory store for the serverless deployment, the Perplexity upstream
//! client, and configuration loading.

pub mod config;
pub mod llm;
pub mod memory;
pub mod sqlite;
