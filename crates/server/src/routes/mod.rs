//! API route handlers
//!
//! - `health`: liveness, readiness and server metadata
//! - `complaints`: submission with duplicate detection, and tracking

pub mod complaints;
pub mod health;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info (GET /)
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Grievance Server",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "/api/v1/complaints/submit",
            "/api/v1/complaints/track/{reference_id}",
            "/api/v1/metadata",
            "/health",
            "/ready"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
