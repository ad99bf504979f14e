//! Upload constraints enforced before any pipeline work.

use healthflow_core::config::UploadConfig;

use crate::pipeline::PipelineError;

/// Reject anything that is not a PDF within the size ceiling.
pub fn validate(
    content_type: Option<&str>,
    size: usize,
    config: &UploadConfig,
) -> Result<(), PipelineError> {
    let content_type = content_type.unwrap_or_default();
    if !is_allowed_mime(content_type, &config.allowed_mime) {
        return Err(PipelineError::InvalidFileType {
            content_type: content_type.to_string(),
        });
    }
    check_size(size, config)
}

pub fn check_size(size: usize, config: &UploadConfig) -> Result<(), PipelineError> {
    if size > config.max_bytes {
        return Err(PipelineError::FileTooLarge {
            max_bytes: config.max_bytes,
        });
    }
    Ok(())
}

/// Compares the essence only, so `application/pdf; name=x.pdf` is accepted.
fn is_allowed_mime(content_type: &str, allowed: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(allowed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_within_limit() {
        let config = UploadConfig::default();
        assert!(validate(Some("application/pdf"), 1024, &config).is_ok());
        assert!(validate(Some("application/pdf; name=lab.pdf"), 1024, &config).is_ok());
    }

    #[test]
    fn rejects_other_types() {
        let config = UploadConfig::default();
        for ct in [Some("image/png"), Some("text/plain"), None] {
            let err = validate(ct, 10, &config).unwrap_err();
            assert_eq!(err.category(), "Invalid file type");
        }
    }

    #[test]
    fn size_ceiling_is_inclusive() {
        let config = UploadConfig::default();
        assert!(validate(Some("application/pdf"), config.max_bytes, &config).is_ok());
        let err = validate(Some("application/pdf"), config.max_bytes + 1, &config).unwrap_err();
        assert_eq!(err.category(), "File too large");
        assert!(err.message().contains("10 MB"));
    }
}
