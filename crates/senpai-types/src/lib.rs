//! Shared domain types for Senpai.
//!
//! This crate contains the core domain types used across the Senpai chat
//! backend: users, chat sessions, messages, upstream completion types,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod user;
