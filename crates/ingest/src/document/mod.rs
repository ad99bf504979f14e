mod cleaner;
mod pdf;

use std::fmt;

use thiserror::Error;

pub use cleaner::clean_text;
pub use pdf::{default_strategies, PdfExtractor, Strategy, StrategyFn};

/// Why every extraction strategy failed, derived from the first failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfFailureKind {
    CorruptedStructure,
    EncryptedOrPasswordProtected,
    InvalidFormat,
    TooLargeOrComplex,
    Unknown,
}

impl PdfFailureKind {
    /// Keyword match against the lowercased parser message. First family wins.
    pub fn classify(message: &str) -> Self {
        let msg = message.to_lowercase();
        if msg.contains("xref") {
            Self::CorruptedStructure
        } else if msg.contains("encrypted") || msg.contains("password") {
            Self::EncryptedOrPasswordProtected
        } else if msg.contains("invalid") || msg.contains("format") {
            Self::InvalidFormat
        } else if msg.contains("memory") || msg.contains("size") {
            Self::TooLargeOrComplex
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CorruptedStructure => "corrupted_structure",
            Self::EncryptedOrPasswordProtected => "encrypted_or_password_protected",
            Self::InvalidFormat => "invalid_format",
            Self::TooLargeOrComplex => "too_large_or_complex",
            Self::Unknown => "unknown",
        }
    }

    /// User-facing guidance for this failure family.
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::CorruptedStructure => {
                "This PDF file appears to be corrupted or has structural issues. Please try:\n\
                 • Re-downloading the PDF from the original source\n\
                 • Asking your healthcare provider for a fresh copy\n\
                 • Converting the PDF to a new PDF file using a PDF editor"
            }
            Self::EncryptedOrPasswordProtected => {
                "This PDF file is password-protected or encrypted. Please:\n\
                 • Remove password protection from the PDF\n\
                 • Save an unprotected copy of your medical report\n\
                 • Contact your healthcare provider for an unprotected version"
            }
            Self::InvalidFormat => {
                "This file may not be a valid PDF or may be corrupted. Please:\n\
                 • Verify the file is a genuine PDF medical report\n\
                 • Try downloading the report again\n\
                 • Check if the file opens correctly in a PDF viewer"
            }
            Self::TooLargeOrComplex => {
                "The PDF file is too large or complex to process. Please:\n\
                 • Try compressing the PDF file\n\
                 • Use a smaller file (under 10MB)\n\
                 • Split multi-page reports into smaller sections"
            }
            Self::Unknown => {
                "Unable to process this PDF file. This could be due to:\n\
                 • File corruption or damage\n\
                 • Unsupported PDF format\n\
                 • Complex document structure\n\n\
                 Please try uploading a different medical report or contact support if the issue persists."
            }
        }
    }
}

impl fmt::Display for PdfFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    /// At least one strategy raised; `message` is the first raw parser message.
    #[error("PDF extraction failed ({kind}): {message}")]
    Failed {
        kind: PdfFailureKind,
        message: String,
    },
    /// Every strategy ran cleanly but produced no text (image-only or blank PDF).
    #[error("no readable text could be extracted from the PDF")]
    NoText,
}

impl ExtractionError {
    pub fn kind(&self) -> Option<PdfFailureKind> {
        match self {
            Self::Failed { kind, .. } => Some(*kind),
            Self::NoText => None,
        }
    }
}
