use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use healthflow_core::config::LlmConfig;

use crate::provider::{LlmError, LlmProvider};

/// Local model served by Ollama, handy for development without a Gemini key.
pub struct OllamaProvider {
    client: reqwest::Client,
    url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OllamaProvider {
    pub fn new(url: String, model: String, llm_config: &LlmConfig) -> Self {
        Self {
            client: super::http_client(llm_config),
            url: url.trim_end_matches('/').to_string(),
            model,
            temperature: llm_config.temperature,
            max_tokens: llm_config.max_tokens,
        }
    }

    fn build_request_body(&self, prompt: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "num_predict": self.max_tokens,
            },
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.url);
        let body = self.build_request_body(prompt);

        debug!("Ollama request to {} (model={})", url, self.model);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let resp: serde_json::Value = response.json().await?;
        let content = resp["response"]
            .as_str()
            .ok_or_else(|| LlmError::ParseError("missing response".into()))?
            .to_string();

        Ok(content)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
