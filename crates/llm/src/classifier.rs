use std::sync::Arc;

use healthflow_core::ClassificationVerdict;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::prompts;
use crate::provider::LlmProvider;

/// Confidence assigned when the classification call itself fails.
pub const TECHNICAL_FAILURE_CONFIDENCE: f64 = 0.3;
/// Reason attached to the fail-open verdict.
pub const TECHNICAL_FAILURE_REASON: &str = "could not validate due to technical issue";

const HEURISTIC_MATCH_CONFIDENCE: f64 = 0.6;
const HEURISTIC_MISS_CONFIDENCE: f64 = 0.4;
const HEURISTIC_KEYWORDS: [&str; 3] = ["true", "medical", "health"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerdict {
    is_valid: bool,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    reason: String,
}

/// Gate deciding whether extracted text is a medical document.
///
/// Never returns an error: an unparseable answer goes through a keyword
/// heuristic and a failed call passes through at low confidence, leaving the
/// threshold decision to the caller.
pub struct MedicalClassifier {
    provider: Arc<dyn LlmProvider>,
    sample_chars: usize,
}

impl MedicalClassifier {
    pub fn new(provider: Arc<dyn LlmProvider>, sample_chars: usize) -> Self {
        Self {
            provider,
            sample_chars,
        }
    }

    pub async fn classify(&self, text: &str) -> ClassificationVerdict {
        let prompt = prompts::classification_prompt(text, self.sample_chars);

        let response = match self.provider.generate(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "classification call failed, passing through");
                return ClassificationVerdict::new(
                    true,
                    TECHNICAL_FAILURE_CONFIDENCE,
                    TECHNICAL_FAILURE_REASON,
                );
            }
        };
        debug!("classifier response: {}", response);

        let verdict = parse_verdict(&response);
        info!(
            is_valid = verdict.is_valid,
            confidence = verdict.confidence,
            "document classified"
        );
        verdict
    }
}

/// Parse the model's answer, falling back to keyword matching on the raw text.
pub fn parse_verdict(response: &str) -> ClassificationVerdict {
    match serde_json::from_str::<RawVerdict>(extract_json(response)) {
        Ok(raw) => ClassificationVerdict::new(raw.is_valid, raw.confidence, raw.reason),
        Err(e) => {
            debug!(error = %e, "classifier response is not JSON, using keyword heuristic");
            heuristic_verdict(response)
        }
    }
}

fn heuristic_verdict(response: &str) -> ClassificationVerdict {
    let lower = response.to_lowercase();
    if HEURISTIC_KEYWORDS.iter().any(|k| lower.contains(k)) {
        ClassificationVerdict::new(
            true,
            HEURISTIC_MATCH_CONFIDENCE,
            "Content appears to be medical-related",
        )
    } else {
        ClassificationVerdict::new(
            false,
            HEURISTIC_MISS_CONFIDENCE,
            "Content does not appear to be a medical report",
        )
    }
}

/// Extract JSON from an LLM response, handling markdown code blocks.
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json") {
        let json_start = start + 7;
        if let Some(end) = trimmed[json_start..].find("```") {
            return trimmed[json_start..json_start + end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after_tick = &trimmed[start + 3..];
        // Skip a language tag on the fence line
        let content_start = after_tick.find('\n').map_or(0, |n| n + 1);
        if let Some(end) = after_tick[content_start..].find("```") {
            return after_tick[content_start..content_start + end].trim();
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return &trimmed[start..=end];
        }
    }

    trimmed
}
