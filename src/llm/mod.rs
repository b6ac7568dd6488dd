//! LLM integration: a local chat model behind the `LlmProvider` trait.
//!
//! Chat goes through rig-core's Ollama client, with `RigAdapter` bridging
//! rig's `CompletionModel` to `LlmProvider`.

mod ollama;
pub mod provider;
mod rig_adapter;

pub use ollama::OllamaProvider;
pub use provider::*;
pub use rig_adapter::RigAdapter;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::LlmError;

/// Create the chat provider from configuration.
pub fn create_provider(config: &AppConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider = OllamaProvider::new(&config.ollama_base_url, &config.ollama_model)?;
    tracing::info!("Using Ollama at {} (model: {})", config.ollama_base_url, config.ollama_model);
    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_provider_uses_configured_model() {
        let provider = create_provider(&AppConfig::for_tests()).unwrap();
        assert_eq!(provider.model_name(), "llama3.1:8b");
    }
}
