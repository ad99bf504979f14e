//! HTTP endpoint modules.
//!
//! Each sub-module owns one endpoint; shared fallbacks live here.

mod analyze;
pub mod doc;
mod health;

use axum::http::StatusCode;
use axum::Json;

pub use analyze::analyze;
pub use health::health;

/// Catch-all for unknown paths.
pub async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Route not found",
            "message": "The requested endpoint does not exist",
        })),
    )
}
