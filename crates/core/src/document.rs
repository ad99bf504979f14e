use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single uploaded file. Lives for one request and is never persisted.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    /// Size as declared by the upload (equals `bytes.len()` for in-memory uploads).
    pub declared_size: usize,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            filename: filename.into(),
            declared_size: bytes.len(),
            bytes,
        }
    }
}

/// Result of asking the classifier whether text is a medical document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationVerdict {
    pub is_valid: bool,
    /// Always in `[0, 1]`.
    pub confidence: f64,
    pub reason: String,
}

impl ClassificationVerdict {
    pub fn new(is_valid: bool, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            is_valid,
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
        }
    }

    /// Gate check: valid AND at or above the threshold (inclusive).
    pub fn passes(&self, min_confidence: f64) -> bool {
        self.is_valid && self.confidence >= min_confidence
    }
}

/// The terminal artifact handed back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub filename: String,
    pub extracted_text: String,
    #[serde(rename = "analysis")]
    pub analysis_narrative: String,
    pub processed_at: DateTime<Utc>,
    pub validation_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        assert!(ClassificationVerdict::new(true, 0.6, "lab results").passes(0.6));
        assert!(!ClassificationVerdict::new(true, 0.59, "lab results").passes(0.6));
        assert!(!ClassificationVerdict::new(false, 0.95, "invoice").passes(0.6));
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(ClassificationVerdict::new(true, 1.7, "x").confidence, 1.0);
        assert_eq!(ClassificationVerdict::new(false, -0.2, "x").confidence, 0.0);
    }

    #[test]
    fn report_serializes_with_wire_names() {
        let report = AnalysisReport {
            filename: "cbc.pdf".into(),
            extracted_text: "Hemoglobin: 13.5".into(),
            analysis_narrative: "## Summary".into(),
            processed_at: Utc::now(),
            validation_score: 0.9,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["filename"], "cbc.pdf");
        assert_eq!(json["extractedText"], "Hemoglobin: 13.5");
        assert_eq!(json["analysis"], "## Summary");
        assert!(json["processedAt"].is_string());
        assert_eq!(json["validationScore"], 0.9);
    }
}
