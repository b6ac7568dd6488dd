//! Bridges rig's `CompletionModel` to our `LlmProvider` trait.

use std::time::Duration;

use async_trait::async_trait;
use rig::completion::{AssistantContent, CompletionModel, Message};

use super::provider::{ChatMessage, ChatRole, CompletionRequest, CompletionResponse, LlmProvider};
use crate::error::LlmError;

/// A rig completion model behind `LlmProvider`.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
    provider: &'static str,
    timeout: Duration,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str, provider: &'static str, timeout: Duration) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            provider,
            timeout,
        }
    }

    fn failed(&self, reason: impl ToString) -> LlmError {
        LlmError::RequestFailed {
            provider: self.provider.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Rig request parts built from our messages.
struct RigParts {
    preamble: Option<String>,
    history: Vec<Message>,
    prompt: Message,
}

/// System messages become the preamble. The last remaining message is the
/// prompt and everything before it is history. `None` if nothing but
/// system messages was supplied.
fn split_messages(messages: Vec<ChatMessage>) -> Option<RigParts> {
    let mut system = Vec::new();
    let mut history = Vec::new();
    for message in messages {
        match message.role {
            ChatRole::System => system.push(message.content),
            ChatRole::User => history.push(Message::user(message.content)),
            ChatRole::Assistant => history.push(Message::assistant(message.content)),
        }
    }
    let prompt = history.pop()?;
    Some(RigParts {
        preamble: (!system.is_empty()).then(|| system.join("\n\n")),
        history,
        prompt,
    })
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let parts = split_messages(request.messages)
            .ok_or_else(|| self.failed("request has no user or assistant message"))?;

        let mut builder = self.model.completion_request(parts.prompt).messages(parts.history);
        if let Some(preamble) = parts.preamble {
            builder = builder.preamble(preamble);
        }

        let response = tokio::time::timeout(self.timeout, builder.send())
            .await
            .map_err(|_| self.failed(format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| self.failed(e))?;

        let content: String = response
            .choice
            .iter()
            .filter_map(|part| match part {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect();

        Ok(CompletionResponse {
            content,
            model: self.model_name.clone(),
        })
    }

    async fn ping(&self) -> Result<usize, LlmError> {
        Err(self.failed("ping is not supported by this provider"))
    }
}
