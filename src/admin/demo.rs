//! Demo data.

use serde::Serialize;
use tracing::info;

use crate::conversations::{Conversation, Message};
use crate::llm::ChatRole;
use crate::store::ResilientStore;
use crate::tasks::{Priority, Task};

#[derive(Debug, Clone, Serialize)]
pub struct DemoSeed {
    pub tasks_created: usize,
    pub task_ids: Vec<String>,
    pub conversation_id: String,
    pub messages_added: usize,
}

/// Create three sample tasks and a two-message conversation.
pub async fn seed_demo(
    tasks: &ResilientStore<Task>,
    conversations: &ResilientStore<Conversation>,
) -> DemoSeed {
    let samples = [
        ("Prepare demo slides", "Deck for class demo", Priority::High),
        ("Test voice pipeline", "Run TTS and STT", Priority::Medium),
        ("Clean data cache", "Remove old logs", Priority::Low),
    ];
    let mut task_ids = Vec::with_capacity(samples.len());
    for (title, details, priority) in samples {
        task_ids.push(tasks.create(Task::new(title, details, priority)).await.id);
    }

    let mut conversation = Conversation::new("Demo conversation");
    conversation.messages = vec![
        Message::new(ChatRole::User, "Hey, summarize my tasks."),
        Message::new(
            ChatRole::Assistant,
            "Sure! You have 3 tasks: slides, voice tests, and cache cleanup.",
        ),
    ];
    let messages_added = conversation.messages.len();
    let conversation = conversations.create(conversation).await;

    info!(tasks = task_ids.len(), conversation_id = %conversation.id, "Demo data seeded");
    DemoSeed {
        tasks_created: task_ids.len(),
        task_ids,
        conversation_id: conversation.id,
        messages_added,
    }
}
