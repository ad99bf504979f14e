//! HTTP router construction.
//!
//! Assembles routes, middleware, and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// Headroom above the upload ceiling for multipart framing, so an oversized
/// file is reported by the upload check rather than cut off mid-stream.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.upload.max_bytes + MULTIPART_OVERHEAD;
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/health", get(api::health))
        .route(
            "/api/analyze",
            post(api::analyze).layer(DefaultBodyLimit::max(body_limit)),
        )
        .fallback(api::not_found)
        .layer(cors)
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(e) => {
            warn!("Ignoring invalid CORS_ORIGIN '{}': {}", origin, e);
            CorsLayer::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use healthflow_core::Config;
    use healthflow_ingest::{PdfExtractor, Strategy};
    use healthflow_llm::{LlmError, LlmProvider};

    use super::*;
    use crate::pipeline::ReportPipeline;

    const BOUNDARY: &str = "healthflow-test-boundary";
    const REPORT: &str = "PATIENT: Jane Roe. Lipid panel drawn fasting. Cholesterol: 240 mg/dL High. \
HDL: 38 mg/dL Low. LDL: 160 mg/dL High. Triglycerides: 210 mg/dL High. Review with physician.";

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmProvider for CountingProvider {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if prompt.contains("medical document classifier") {
                Ok(r#"```json
{"isValid": true, "confidence": 0.88, "reason": "Lipid panel with values"}
```"#
                    .into())
            } else {
                Ok("## Summary\nCholesterol is elevated.".into())
            }
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn utf8_text(bytes: &[u8]) -> Result<String, String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())
    }

    fn test_app() -> (Router, Arc<CountingProvider>) {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let config = Config::for_profile("");
        let pipeline = ReportPipeline::new(
            PdfExtractor::with_strategies(vec![Strategy::new("utf8", utf8_text)]),
            provider.clone(),
            &config.pipeline,
        );
        let state = Arc::new(AppState {
            config,
            pipeline,
            llm_configured: true,
        });
        (build_router(state), provider)
    }

    fn multipart_request(field: &str, filename: &str, content_type: &str, body: &[u8]) -> Request<Body> {
        let mut payload = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        payload.extend_from_slice(body);
        payload.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(payload))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _) = test_app();
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "OK");
        assert_eq!(json["llmConfigured"], true);
        assert!(json["config"]["pipeline"]["minConfidence"].is_number());
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (app, _) = test_app();
        let req = Request::builder().uri("/api/nope").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "Route not found");
    }

    #[tokio::test]
    async fn analyze_returns_report() {
        let (app, provider) = test_app();
        let req = multipart_request("report", "lipids.pdf", "application/pdf", REPORT.as_bytes());
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["filename"], "lipids.pdf");
        assert_eq!(json["data"]["validationScore"], 0.88);
        assert_eq!(json["data"]["analysis"], "## Summary\nCholesterol is elevated.");
        assert!(json["data"]["extractedText"]
            .as_str()
            .unwrap()
            .contains("- **Cholesterol:** 240 mg/dL High"));
        assert!(json["data"]["processedAt"].is_string());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn first_file_field_is_accepted() {
        let (app, _) = test_app();
        let req = multipart_request("document", "lipids.pdf", "application/pdf", REPORT.as_bytes());
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn non_pdf_is_rejected_before_pipeline() {
        let (app, provider) = test_app();
        let req = multipart_request("report", "notes.txt", "text/plain", REPORT.as_bytes());
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "Invalid file type");
        assert_eq!(json["message"], "Only PDF files are allowed");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oversized_pdf_is_rejected_before_pipeline() {
        let (app, provider) = test_app();
        let big = vec![b'a'; healthflow_core::config::DEFAULT_MAX_UPLOAD_BYTES + 1];
        let req = multipart_request("report", "big.pdf", "application/pdf", &big);
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "File too large");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_file_is_400() {
        let (app, _) = test_app();
        let payload = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(payload))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "No file uploaded");
    }
}
