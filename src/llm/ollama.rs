//! Local Ollama server: chat through rig, model listing over `/api/tags`.

use std::time::Duration;

use async_trait::async_trait;
use rig::client::{CompletionClient, Nothing};
use rig::providers::ollama;
use serde::Deserialize;

use super::provider::{CompletionRequest, CompletionResponse, LlmProvider};
use super::rig_adapter::RigAdapter;
use crate::error::LlmError;

const PROVIDER: &str = "ollama";
const CHAT_TIMEOUT: Duration = Duration::from_secs(30);
const PING_TIMEOUT: Duration = Duration::from_secs(5);

pub struct OllamaProvider {
    chat: Box<dyn LlmProvider>,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct TagsReply {
    #[serde(default)]
    models: Vec<serde_json::Value>,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str) -> Result<Self, LlmError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client: ollama::Client = ollama::Client::builder()
            .api_key(Nothing)
            .base_url(&base_url)
            .build()
            .map_err(|e| request_failed(format!("Failed to create Ollama client: {e}")))?;

        let chat = RigAdapter::new(
            client.completion_model(model),
            model,
            PROVIDER,
            CHAT_TIMEOUT,
        );
        Ok(Self {
            chat: Box::new(chat),
            base_url,
            client: reqwest::Client::new(),
        })
    }
}

fn request_failed(reason: impl ToString) -> LlmError {
    LlmError::RequestFailed {
        provider: PROVIDER.to_string(),
        reason: reason.to_string(),
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn model_name(&self) -> &str {
        self.chat.model_name()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.chat.complete(request).await
    }

    async fn ping(&self) -> Result<usize, LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = self
            .client
            .get(&url)
            .timeout(PING_TIMEOUT)
            .send()
            .await
            .map_err(request_failed)?
            .error_for_status()
            .map_err(request_failed)?;
        let tags: TagsReply = resp.json().await.map_err(|e| LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: e.to_string(),
        })?;
        Ok(tags.models.len())
    }
}
