//! Compression adapter.
//!
//! Without a credential every call is answered locally with a fixed-ratio
//! estimate. With one, the text goes to the remote service and any failure is
//! returned to the caller; there is no local fallback in that mode.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::conversations::Conversation;
use crate::error::CompressionError;

const REMOTE_TIMEOUT: Duration = Duration::from_secs(10);
const LOCAL_RATIO: f64 = 0.85;
const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionResult {
    pub ok: bool,
    pub ratio: f64,
    pub original_size: u64,
    pub compressed_size: u64,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationCompression {
    #[serde(flatten)]
    pub result: CompressionResult,
    /// First 200 characters of the compressed input.
    pub input_preview: String,
}

pub struct Compressor {
    api_key: Option<SecretString>,
    url: String,
    client: reqwest::Client,
}

/// Deterministic estimate: 15% of the UTF-8 byte length, at least 1.
pub fn estimate_local(text: &str) -> CompressionResult {
    let original_size = text.len() as u64;
    CompressionResult {
        ok: true,
        ratio: LOCAL_RATIO,
        original_size,
        compressed_size: (original_size * 15 / 100).max(1),
        summary: "Simulated compression (no API key)".to_string(),
    }
}

impl Compressor {
    pub fn new(api_key: Option<SecretString>, url: impl Into<String>) -> Self {
        Self {
            api_key,
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.scaledown_api_key.clone(), config.scaledown_url.clone())
    }

    pub fn is_remote(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn compress(&self, text: &str) -> Result<CompressionResult, CompressionError> {
        let Some(key) = &self.api_key else {
            return Ok(estimate_local(text));
        };

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(key.expose_secret())
            .timeout(REMOTE_TIMEOUT)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Compression request failed");
                CompressionError::RequestFailed(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Compression service rejected request");
            return Err(CompressionError::Status(status.as_u16()));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| CompressionError::InvalidResponse(e.to_string()))?;
        let result = parse_remote(&body);
        debug!(ratio = result.ratio, original = result.original_size, "Text compressed");
        Ok(result)
    }

    /// Compress a one-line-per-conversation digest of `conversations`.
    pub async fn compress_conversations(
        &self,
        conversations: &[Conversation],
    ) -> Result<ConversationCompression, CompressionError> {
        let digest = conversations
            .iter()
            .map(|c| format!("{}: {} messages", c.title, c.messages.len()))
            .collect::<Vec<_>>()
            .join("\n");
        let input = if digest.is_empty() { "(no conversations)" } else { digest.as_str() };
        let result = self.compress(input).await?;
        Ok(ConversationCompression {
            result,
            input_preview: digest.chars().take(PREVIEW_CHARS).collect(),
        })
    }
}

/// Pass the service's numbers through; missing fields are zero.
fn parse_remote(body: &Value) -> CompressionResult {
    CompressionResult {
        ok: true,
        ratio: body.get("ratio").and_then(Value::as_f64).unwrap_or(0.0),
        original_size: size_field(body, "original_size"),
        compressed_size: size_field(body, "compressed_size"),
        summary: "ScaleDown compression".to_string(),
    }
}

/// Integer sizes pass through; floats are truncated.
fn size_field(body: &Value, key: &str) -> u64 {
    body.get(key)
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f as u64)))
        .unwrap_or(0)
}
