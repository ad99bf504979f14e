use std::sync::Arc;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, Instrument};
use uuid::Uuid;

use healthflow_core::config::UploadConfig;
use healthflow_core::{AnalysisReport, UploadedDocument};

use crate::pipeline::{ErrorBody, PipelineError};
use crate::state::AppState;
use crate::upload;

/// Multipart field carrying the PDF.
pub const REPORT_FIELD: &str = "report";

#[derive(Serialize, utoipa::ToSchema)]
pub struct AnalyzeResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: AnalysisReport,
}

struct ReceivedFile {
    filename: String,
    content_type: Option<String>,
    bytes: Bytes,
}

/// Analyze a medical report
///
/// Accepts multipart/form-data with a `report` PDF field. The PDF is
/// converted to text, checked to be a medical document, and summarized.
#[utoipa::path(
    post,
    path = "/api/analyze",
    tag = "Analysis",
    request_body(content_type = "multipart/form-data", description = "PDF upload in the `report` field"),
    responses(
        (status = 200, description = "Report analyzed", body = AnalyzeResponse),
        (status = 400, description = "Invalid upload, unreadable PDF, or non-medical content", body = ErrorBody),
        (status = 500, description = "AI analysis failed", body = ErrorBody),
        (status = 504, description = "Analysis timed out", body = ErrorBody)
    )
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, PipelineError> {
    let span = tracing::info_span!(
        "analyze",
        request_id = %Uuid::new_v4(),
        filename = tracing::field::Empty
    );

    async move {
        let upload_config = &state.config.upload;
        let file = read_report_field(multipart, upload_config)
            .await?
            .ok_or(PipelineError::MissingFile)?;
        tracing::Span::current().record("filename", file.filename.as_str());

        upload::validate(file.content_type.as_deref(), file.bytes.len(), upload_config)?;
        info!(bytes = file.bytes.len(), "processing PDF");

        let report = state
            .pipeline
            .run(UploadedDocument::new(file.filename, file.bytes))
            .await?;
        Ok::<_, PipelineError>(Json(AnalyzeResponse {
            success: true,
            data: report,
        }))
    }
    .instrument(span)
    .await
}

/// Take the `report` field, or the first file field when none is named so.
async fn read_report_field(
    mut multipart: Multipart,
    config: &UploadConfig,
) -> Result<Option<ReceivedFile>, PipelineError> {
    let mut fallback = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, config))?
    {
        let is_report = field.name() == Some(REPORT_FIELD);
        if is_report || (fallback.is_none() && field.file_name().is_some()) {
            let file = read_field(field, config).await?;
            if is_report {
                return Ok(Some(file));
            }
            fallback = Some(file);
        }
    }

    Ok(fallback)
}

async fn read_field(field: Field<'_>, config: &UploadConfig) -> Result<ReceivedFile, PipelineError> {
    let filename = field.file_name().unwrap_or("unnamed.pdf").to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(|e| multipart_error(e, config))?;
    Ok(ReceivedFile {
        filename,
        content_type,
        bytes,
    })
}

fn multipart_error(e: MultipartError, config: &UploadConfig) -> PipelineError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PipelineError::FileTooLarge {
            max_bytes: config.max_bytes,
        }
    } else {
        PipelineError::MalformedUpload(e.body_text())
    }
}
