//! Conversation summaries: local model when available, tail transcript otherwise.

use serde::Serialize;
use tracing::warn;

use super::model::Message;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

const HEURISTIC_TAIL: usize = 4;
const LLM_TAIL: usize = 12;
const SUMMARY_PROMPT: &str = "Summarize this conversation in 2-3 short sentences.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryMethod {
    Llm,
    Heuristic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub summary: String,
    pub method: SummaryMethod,
}

/// Last four messages as `role: content` joined by ` | `.
pub fn heuristic_summary(messages: &[Message]) -> String {
    if messages.is_empty() {
        return "No messages yet.".to_string();
    }
    let start = messages.len().saturating_sub(HEURISTIC_TAIL);
    messages[start..]
        .iter()
        .map(Message::transcript_line)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Summarize `messages`, asking the model first when `prefer_llm` is set.
/// Model errors and empty replies fall back to the heuristic.
pub async fn summarize(messages: &[Message], llm: &dyn LlmProvider, prefer_llm: bool) -> Summary {
    if prefer_llm && !messages.is_empty() {
        let start = messages.len().saturating_sub(LLM_TAIL);
        let transcript = messages[start..]
            .iter()
            .map(Message::transcript_line)
            .collect::<Vec<_>>()
            .join("\n");
        let request = CompletionRequest::new(vec![
            ChatMessage::system(SUMMARY_PROMPT),
            ChatMessage::user(transcript),
        ]);
        match llm.complete(request).await {
            Ok(resp) if !resp.content.trim().is_empty() => {
                return Summary {
                    summary: resp.content,
                    method: SummaryMethod::Llm,
                };
            }
            Ok(_) => warn!("Model returned an empty summary, using heuristic"),
            Err(e) => warn!(error = %e, "Summary model call failed, using heuristic"),
        }
    }

    Summary {
        summary: heuristic_summary(messages),
        method: SummaryMethod::Heuristic,
    }
}
