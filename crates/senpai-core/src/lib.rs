//! Business logic and trait definitions for Senpai.
//!
//! This crate defines the "ports" (the `ChatStore` storage trait and the
//! `CompletionBackend` provider trait) that the infrastructure layer
//! implements, plus the orchestration built on top of them: the assistant
//! client and the chat service. It depends only on `senpai-types` -- never
//! on `senpai-infra` or any database/HTTP crate.

pub mod chat;
pub mod llm;
