pub mod gemini;
pub mod ollama;

use std::sync::Arc;

use healthflow_core::config::{LlmConfig, OllamaConfig};
use tracing::warn;

use crate::provider::{LlmError, LlmProvider};

/// Create the appropriate LLM provider based on config.
pub fn create_provider(
    llm_config: &LlmConfig,
    ollama_config: &OllamaConfig,
) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match llm_config.provider.as_str() {
        "gemini" => {
            let api_key = llm_config
                .gemini_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("GEMINI_API_KEY is not configured".into()))?;
            Ok(Arc::new(gemini::GeminiProvider::new(
                api_key.clone(),
                llm_config.gemini_model.clone(),
                llm_config.gemini_base_url.clone(),
                llm_config,
            )))
        }
        "ollama" => Ok(Arc::new(ollama::OllamaProvider::new(
            ollama_config.url.clone(),
            ollama_config.model.clone(),
            llm_config,
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}

/// Stand-in used when no provider could be built. Every call fails with the
/// original configuration error, so the classifier fails open and analysis
/// reports a clear cause.
pub struct UnavailableProvider {
    reason: String,
}

impl UnavailableProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for UnavailableProvider {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::NotConfigured(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

/// HTTP client shared shape: every provider call is bounded by the request timeout.
pub(crate) fn http_client(llm_config: &LlmConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(llm_config.timeout())
        .build()
        .unwrap_or_else(|e| {
            warn!(
                "HTTP client build failed ({}), model calls fall back to no per-call timeout",
                e
            );
            reqwest::Client::new()
        })
}
