//! Process-local in-memory persistence for the serverless deployment.

pub mod chat;
