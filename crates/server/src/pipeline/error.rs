use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use healthflow_core::ClassificationVerdict;
use healthflow_ingest::{ExtractionError, PdfFailureKind};
use healthflow_llm::AnalysisError;

const PDF_SUGGESTION: &str = "Please ensure you upload a valid, unprotected PDF medical report. \
If the issue persists, try downloading a fresh copy of your medical report.";
const EMPTY_SUGGESTION: &str = "Please ensure your medical report contains readable text \
(not just images) and try uploading again.";
const NOT_MEDICAL_SUGGESTION: &str = "Make sure you upload a PDF containing medical test results, \
lab reports, health checkups, diagnostic imaging results, or other medical documentation.";
const INSUFFICIENT_SUGGESTION: &str =
    "Please ensure you upload a complete medical report with sufficient detail for analysis.";
const TIMEOUT_SUGGESTION: &str =
    "The AI service took too long to respond. Please try again in a moment.";

/// Caller-facing failure families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUpload,
    PdfExtractionFailed,
    EmptyExtraction,
    NotMedicalReport,
    InsufficientContent,
    AiAnalysisFailed,
    Timeout,
    InternalError,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no file uploaded")]
    MissingFile,
    #[error("unsupported content type: {content_type}")]
    InvalidFileType { content_type: String },
    #[error("file exceeds {max_bytes} bytes")]
    FileTooLarge { max_bytes: usize },
    #[error("malformed upload: {0}")]
    MalformedUpload(String),
    #[error("PDF extraction failed ({kind}): {detail}")]
    PdfExtraction { kind: PdfFailureKind, detail: String },
    #[error("no readable text in PDF")]
    EmptyExtraction,
    #[error("not a medical report (confidence {:.2}): {}", .verdict.confidence, .verdict.reason)]
    NotMedicalReport { verdict: ClassificationVerdict },
    #[error("content too short: {chars} < {min_chars} characters")]
    InsufficientContent { chars: usize, min_chars: usize },
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("AI analysis returned no content")]
    EmptyAnalysis,
    #[error("pipeline timed out after {secs}s")]
    Timeout { secs: u64 },
    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MissingFile
            | Self::InvalidFileType { .. }
            | Self::FileTooLarge { .. }
            | Self::MalformedUpload(_) => FailureKind::InvalidUpload,
            Self::PdfExtraction { .. } => FailureKind::PdfExtractionFailed,
            Self::EmptyExtraction => FailureKind::EmptyExtraction,
            Self::NotMedicalReport { .. } => FailureKind::NotMedicalReport,
            Self::InsufficientContent { .. } => FailureKind::InsufficientContent,
            Self::Analysis(_) | Self::EmptyAnalysis => FailureKind::AiAnalysisFailed,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Internal(_) => FailureKind::InternalError,
        }
    }

    /// The `error` field of the failure body.
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingFile => "No file uploaded",
            Self::InvalidFileType { .. } => "Invalid file type",
            Self::FileTooLarge { .. } => "File too large",
            Self::MalformedUpload(_) => "Invalid upload",
            Self::PdfExtraction { .. } => "PDF processing failed",
            Self::EmptyExtraction => "PDF conversion failed",
            Self::NotMedicalReport { .. } => "Not a medical report",
            Self::InsufficientContent { .. } => "Insufficient content",
            Self::Analysis(_) | Self::EmptyAnalysis => "AI analysis failed",
            Self::Timeout { .. } => "Analysis timed out",
            Self::Internal(_) => "Processing failed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            FailureKind::AiAnalysisFailed | FailureKind::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            FailureKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::MissingFile => "Please upload a PDF file".to_string(),
            Self::InvalidFileType { .. } => "Only PDF files are allowed".to_string(),
            Self::FileTooLarge { max_bytes } => format!(
                "The uploaded file exceeds the {} MB limit",
                max_bytes / (1024 * 1024)
            ),
            Self::MalformedUpload(detail) => format!("Could not read the upload: {detail}"),
            Self::PdfExtraction { kind, .. } => kind.remediation().to_string(),
            Self::EmptyExtraction => "Could not extract any readable text from the PDF file. \
                 The PDF may be image-based, corrupted, or empty."
                .to_string(),
            Self::NotMedicalReport { verdict } => format!(
                "This document doesn't appear to be a medical report. {}. Please upload a valid \
                 medical document such as lab results, health checkup reports, or medical test results.",
                verdict.reason
            ),
            Self::InsufficientContent { .. } => "The document appears to contain very little text. \
                 Medical reports typically contain detailed information about tests, results, and recommendations."
                .to_string(),
            Self::Analysis(e) => e.to_string(),
            Self::EmptyAnalysis => "Could not generate health report analysis".to_string(),
            Self::Timeout { secs } => {
                format!("The analysis did not complete within {secs} seconds")
            }
            Self::Internal(detail) => detail.clone(),
        }
    }

    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::PdfExtraction { .. } => Some(PDF_SUGGESTION),
            Self::EmptyExtraction => Some(EMPTY_SUGGESTION),
            Self::NotMedicalReport { .. } => Some(NOT_MEDICAL_SUGGESTION),
            Self::InsufficientContent { .. } => Some(INSUFFICIENT_SUGGESTION),
            Self::Timeout { .. } => Some(TIMEOUT_SUGGESTION),
            _ => None,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.category(),
            message: self.message(),
            suggestion: self.suggestion(),
            validation_details: match self {
                Self::NotMedicalReport { verdict } => Some(ValidationDetails {
                    confidence: verdict.confidence,
                    reason: verdict.reason.clone(),
                }),
                _ => None,
            },
        }
    }
}

impl From<ExtractionError> for PipelineError {
    fn from(e: ExtractionError) -> Self {
        match e {
            ExtractionError::Failed { kind, message } => Self::PdfExtraction {
                kind,
                detail: message,
            },
            ExtractionError::NoText => Self::EmptyExtraction,
        }
    }
}

/// Failure JSON returned by every endpoint.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[schema(value_type = String)]
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub suggestion: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_details: Option<ValidationDetails>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ValidationDetails {
    pub confidence: f64,
    pub reason: String,
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, category = self.category(), "request failed");
        } else {
            tracing::warn!(error = %self, category = self.category(), "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}
