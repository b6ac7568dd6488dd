//! Conversation data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::ChatRole;
use crate::store::Record;

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    fn role_label(&self) -> &'static str {
        match self.role {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    /// `role: content`, as used in transcripts.
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.role_label(), self.content)
    }
}

/// A titled, ordered thread of messages. Messages are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            messages: Vec::new(),
        }
    }

    /// Whether the title or any message contains `lowered_query`.
    pub fn matches(&self, lowered_query: &str) -> bool {
        self.title.to_lowercase().contains(lowered_query)
            || self
                .messages
                .iter()
                .any(|m| m.content.to_lowercase().contains(lowered_query))
    }
}

impl Record for Conversation {
    const COLLECTION: &'static str = "conversations";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationStats {
    pub total_conversations: usize,
    pub total_messages: usize,
    /// Rounded to two decimals.
    pub avg_messages_per_conversation: f64,
}

impl ConversationStats {
    pub fn from_conversations(conversations: &[Conversation]) -> Self {
        let total_messages: usize = conversations.iter().map(|c| c.messages.len()).sum();
        let avg = if conversations.is_empty() {
            0.0
        } else {
            total_messages as f64 / conversations.len() as f64
        };
        Self {
            total_conversations: conversations.len(),
            total_messages,
            avg_messages_per_conversation: (avg * 100.0).round() / 100.0,
        }
    }
}
