use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use healthflow_core::config::LlmConfig;

use crate::provider::{LlmError, LlmProvider};

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, base_url: String, llm_config: &LlmConfig) -> Self {
        Self {
            client: super::http_client(llm_config),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            temperature: llm_config.temperature,
            max_tokens: llm_config.max_tokens,
        }
    }

    /// Build the request body for the Gemini generateContent API.
    fn build_request_body(prompt: &str, temperature: f32, max_tokens: u32) -> serde_json::Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
            "generationConfig": {
                "temperature": temperature,
                "maxOutputTokens": max_tokens,
            },
        })
    }

    /// Pull the completion text out of a generateContent response.
    fn parse_response(resp: &serde_json::Value) -> Result<String, LlmError> {
        if let Some(text) = resp["candidates"][0]["content"]["parts"][0]["text"].as_str() {
            return Ok(text.to_string());
        }
        // Safety filters return no candidates, only promptFeedback.
        if let Some(reason) = resp["promptFeedback"]["blockReason"].as_str() {
            return Err(LlmError::ParseError(format!("prompt blocked by Gemini: {reason}")));
        }
        Err(LlmError::ParseError(
            "missing candidates[0].content.parts[0].text".into(),
        ))
    }

    /// The key goes in the `x-goog-api-key` header, never in the URL.
    fn build_request(&self, prompt: &str) -> Result<reqwest::Request, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model,
        );
        let body = Self::build_request_body(prompt, self.temperature, self.max_tokens);

        Ok(self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.as_str())
            .header("Content-Type", "application/json")
            .json(&body)
            .build()?)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = self.build_request(prompt)?;

        debug!("Gemini request to model={} ({} prompt chars)", self.model, prompt.len());

        let response = self.client.execute(request).await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let resp: serde_json::Value = response.json().await?;
        Self::parse_response(&resp)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_structure() {
        let body = GeminiProvider::build_request_body("Summarise this report", 0.1, 4096);

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "Summarise this report");

        let temp = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.1).abs() < 1e-6, "temperature should be ~0.1, got {temp}");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 4096);
        assert!(body.get("system_instruction").is_none());
    }

    #[test]
    fn test_parse_candidate_text() {
        let resp = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "## Summary\nAll good." }] },
                "finishReason": "STOP",
            }],
        });
        assert_eq!(
            GeminiProvider::parse_response(&resp).unwrap(),
            "## Summary\nAll good."
        );
    }

    #[test]
    fn test_parse_blocked_prompt() {
        let resp = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = GeminiProvider::parse_response(&resp).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_parse_missing_text() {
        let resp = json!({ "candidates": [] });
        assert!(matches!(
            GeminiProvider::parse_response(&resp),
            Err(LlmError::ParseError(_))
        ));
    }

    const SECRET: &str = "AIzaSy-test-secret-key";

    fn provider(base_url: &str) -> GeminiProvider {
        let config = LlmConfig {
            provider: "gemini".into(),
            gemini_api_key: Some(SECRET.into()),
            gemini_model: "gemini-2.0-flash".into(),
            gemini_base_url: base_url.into(),
            temperature: 0.4,
            max_tokens: 4096,
            timeout_secs: 5,
        };
        GeminiProvider::new(
            SECRET.into(),
            config.gemini_model.clone(),
            base_url.into(),
            &config,
        )
    }

    #[test]
    fn test_api_key_sent_as_header_not_query() {
        let request = provider("https://generativelanguage.googleapis.com/")
            .build_request("hello")
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert!(request.url().query().is_none());
        assert!(!request.url().as_str().contains(SECRET));
        assert_eq!(request.headers()["x-goog-api-key"], SECRET);
    }

    #[tokio::test]
    async fn test_connection_error_does_not_reveal_api_key() {
        // Nothing listens on port 1.
        let err = provider("http://127.0.0.1:1")
            .generate("hello")
            .await
            .unwrap_err();

        let shown = crate::analyzer::AnalysisError::from(err);
        assert!(!shown.to_string().contains(SECRET), "leaked: {shown}");
        assert!(!format!("{shown:?}").contains(SECRET), "leaked: {shown:?}");
    }
}
