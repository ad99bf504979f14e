use async_trait::async_trait;

/// Prompt-in, text-out contract for the generative model.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a single prompt and return the model's completion text.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Short provider name for logs ("gemini", "ollama").
    fn name(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    HttpError(reqwest::Error),
    #[error("request to the AI service timed out")]
    Timeout,
    #[error("API error {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    ParseError(String),
    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::HttpError(e.without_url())
        }
    }
}
