//! Conversations: append-only message threads and their summaries.

pub mod model;
pub mod routes;
pub mod summary;

pub use model::{Conversation, ConversationStats, Message};
pub use summary::{Summary, SummaryMethod};
