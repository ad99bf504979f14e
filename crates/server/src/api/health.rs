use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    #[schema(value_type = String)]
    pub status: &'static str,
    #[schema(value_type = String)]
    pub message: &'static str,
    #[schema(value_type = String)]
    pub version: &'static str,
    pub llm_configured: bool,
    /// Redacted runtime configuration.
    #[schema(value_type = Object)]
    pub config: serde_json::Value,
}

/// Server liveness
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server is running", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "HealthFlow AI Server is running",
        version: env!("CARGO_PKG_VERSION"),
        llm_configured: state.llm_configured,
        config: state.config.redacted_summary(),
    })
}
