//! SQLite-backed persistence for Senpai.

pub mod chat;
pub mod pool;
