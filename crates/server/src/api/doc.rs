//! OpenAPI document served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HealthFlow API",
        version = "0.1.0",
        description = "Upload a medical report PDF and receive a plain-language AI health summary.",
    ),
    tags(
        (name = "Health", description = "Server liveness and redacted configuration"),
        (name = "Analysis", description = "PDF extraction, medical classification, and AI summary"),
    ),
    paths(
        crate::api::health::health,
        crate::api::analyze::analyze,
    ),
    components(schemas(
        crate::api::health::HealthResponse,
        crate::api::analyze::AnalyzeResponse,
        crate::pipeline::ErrorBody,
        crate::pipeline::ValidationDetails,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_both_endpoints() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/health"));
        assert!(doc.paths.paths.contains_key("/api/analyze"));
    }
}
