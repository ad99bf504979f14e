//! Report pipeline: extraction, classification gate, content check, analysis.
//!
//! Stages run strictly in order and the first failure ends the run. The AI
//! analysis call is only made once the classification gate has passed.

mod error;


use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info, warn};

use healthflow_core::config::PipelineConfig;
use healthflow_core::{AnalysisReport, UploadedDocument};
use healthflow_ingest::PdfExtractor;
use healthflow_llm::{HealthAnalyzer, LlmProvider, MedicalClassifier};

pub use error::{ErrorBody, FailureKind, PipelineError, ValidationDetails};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Extracting,
    Validating,
    ContentLengthCheck,
    Analyzing,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Extracting => "extracting",
            Self::Validating => "validating",
            Self::ContentLengthCheck => "content_length_check",
            Self::Analyzing => "analyzing",
            Self::Done => "done",
        })
    }
}

pub struct ReportPipeline {
    extractor: PdfExtractor,
    classifier: MedicalClassifier,
    analyzer: HealthAnalyzer,
    min_confidence: f64,
    min_content_chars: usize,
    timeout: Duration,
}

impl ReportPipeline {
    pub fn new(
        extractor: PdfExtractor,
        provider: Arc<dyn LlmProvider>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            extractor,
            classifier: MedicalClassifier::new(provider.clone(), config.classifier_sample_chars),
            analyzer: HealthAnalyzer::new(provider),
            min_confidence: config.min_confidence,
            min_content_chars: config.min_content_chars,
            timeout: config.request_timeout(),
        }
    }

    /// Override the whole-run deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run every stage under the request deadline.
    pub async fn run(&self, doc: UploadedDocument) -> Result<AnalysisReport, PipelineError> {
        match tokio::time::timeout(self.timeout, self.run_stages(doc)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "pipeline deadline exceeded");
                Err(PipelineError::Timeout {
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }

    async fn run_stages(&self, doc: UploadedDocument) -> Result<AnalysisReport, PipelineError> {
        info!(stage = %PipelineStage::Extracting, bytes = doc.declared_size, "processing upload");
        let text = self.extract(doc.bytes).await?;
        info!(chars = text.chars().count(), "text extracted");

        info!(stage = %PipelineStage::Validating, "classifying content");
        let verdict = self.classifier.classify(&text).await;
        if !verdict.passes(self.min_confidence) {
            return Err(PipelineError::NotMedicalReport { verdict });
        }
        info!(confidence = verdict.confidence, "classification gate passed");

        debug!(stage = %PipelineStage::ContentLengthCheck);
        let chars = text.chars().count();
        if chars < self.min_content_chars {
            return Err(PipelineError::InsufficientContent {
                chars,
                min_chars: self.min_content_chars,
            });
        }

        info!(stage = %PipelineStage::Analyzing, "requesting analysis");
        let narrative = self.analyzer.analyze(&text).await?;
        if narrative.trim().is_empty() {
            return Err(PipelineError::EmptyAnalysis);
        }

        info!(stage = %PipelineStage::Done, "analysis completed");
        Ok(AnalysisReport {
            filename: doc.filename,
            extracted_text: text,
            analysis_narrative: narrative,
            processed_at: Utc::now(),
            validation_score: verdict.confidence,
        })
    }

    /// Extract and clean text on a blocking thread. Never returns empty text.
    pub async fn extract(&self, bytes: Bytes) -> Result<String, PipelineError> {
        let extractor = self.extractor.clone();
        let text = tokio::task::spawn_blocking(move || extractor.extract(&bytes))
            .await
            .map_err(|e| PipelineError::Internal(format!("extraction task failed: {e}")))??;

        if text.trim().is_empty() {
            return Err(PipelineError::EmptyExtraction);
        }
        Ok(text)
    }
}
