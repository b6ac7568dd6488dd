//! Personal AI hub: task, conversation, profile and agent-routing backend.

pub mod admin;
pub mod agents;
pub mod app;
pub mod audit;
pub mod auth;
pub mod compression;
pub mod config;
pub mod conversations;
pub mod error;
pub mod llm;
pub mod profile;
pub mod status;
pub mod store;
pub mod tasks;
pub mod voice;

#[cfg(test)]
pub(crate) mod testing;
