use std::sync::Arc;

use tracing::{info, warn};

use crate::prompts;
use crate::provider::{LlmError, LlmProvider};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("AI analysis failed: {0}")]
    Failed(#[from] LlmError),
}

/// Produces the plain-language markdown summary of a validated report.
pub struct HealthAnalyzer {
    provider: Arc<dyn LlmProvider>,
}

impl HealthAnalyzer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// One call, no retries. Provider failures propagate.
    pub async fn analyze(&self, text: &str) -> Result<String, AnalysisError> {
        let prompt = prompts::analysis_prompt(text);
        let narrative = self.provider.generate(&prompt).await.map_err(|e| {
            warn!(provider = self.provider.name(), error = %e, "analysis call failed");
            AnalysisError::Failed(e)
        })?;
        info!(chars = narrative.len(), "analysis generated");
        Ok(narrative)
    }
}
