//! Test doubles shared by unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, CompletionResponse, LlmProvider};

/// Canned chat model that records the last request it saw.
pub struct StubLlm {
    reply: Option<String>,
    last: Mutex<Option<Vec<ChatMessage>>>,
}

impl StubLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            last: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            last: Mutex::new(None),
        }
    }

    pub fn last_request(&self) -> Option<Vec<ChatMessage>> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn model_name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        *self.last.lock().unwrap() = Some(request.messages);
        match &self.reply {
            Some(content) => Ok(CompletionResponse {
                content: content.clone(),
                model: "stub".to_string(),
            }),
            None => Err(LlmError::RequestFailed {
                provider: "stub".to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }

    async fn ping(&self) -> Result<usize, LlmError> {
        match self.reply {
            Some(_) => Ok(1),
            None => Err(LlmError::RequestFailed {
                provider: "stub".to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

/// Serve `app` on a random local port and return its base URL.
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{port}")
}

/// A complete non-streaming Ollama `/api/chat` reply.
pub fn ollama_chat_reply(content: &str) -> Value {
    json!({
        "model": "llama3.1:8b",
        "created_at": "2024-05-01T12:00:00Z",
        "message": {"role": "assistant", "content": content},
        "done": true,
        "done_reason": "stop",
        "total_duration": 1,
        "load_duration": 1,
        "prompt_eval_count": 1,
        "prompt_eval_duration": 1,
        "eval_count": 1,
        "eval_duration": 1
    })
}
