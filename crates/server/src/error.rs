use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use matcher::MatchError;
use semantic::SemanticError;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(SemanticError),

    #[error("Match error: {0}")]
    Match(MatchError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::EmbeddingUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Match(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Storage(_) | ServerError::Internal(_) | ServerError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::EmbeddingUnavailable(_) => "EMBEDDING_UNAVAILABLE",
            ServerError::Match(_) => "MATCH_ERROR",
            ServerError::Storage(_) => "STORAGE_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }

        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<MatchError> for ServerError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::EmbeddingProvider(inner) => ServerError::EmbeddingUnavailable(inner),
            MatchError::InvalidInput(msg) => ServerError::BadRequest(msg),
            MatchError::InvalidConfig(msg) => ServerError::Config(msg),
            other => ServerError::Match(other),
        }
    }
}

impl From<SemanticError> for ServerError {
    fn from(err: SemanticError) -> Self {
        match err {
            SemanticError::InvalidConfig(msg) => ServerError::Config(msg),
            other => ServerError::EmbeddingUnavailable(other),
        }
    }
}

impl From<grievance::PipelineError> for ServerError {
    fn from(err: grievance::PipelineError) -> Self {
        ServerError::Config(err.to_string())
    }
}

impl From<grievance::ConfigLoadError> for ServerError {
    fn from(err: grievance::ConfigLoadError) -> Self {
        ServerError::Config(err.to_string())
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::Internal(format!("JSON error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_failures_map_to_service_unavailable() {
        let err: ServerError =
            MatchError::EmbeddingProvider(SemanticError::QuotaExceeded("quota".into())).into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), "EMBEDDING_UNAVAILABLE");
    }

    #[test]
    fn every_variant_has_a_distinct_code() {
        let errors = [
            ServerError::BadRequest("x".into()),
            ServerError::EmbeddingUnavailable(SemanticError::Request("down".into())),
            ServerError::Match(MatchError::DimensionMismatch {
                expected: 2,
                actual: 3,
            }),
            ServerError::Storage("x".into()),
            ServerError::Internal("x".into()),
            ServerError::Config("x".into()),
            ServerError::NotFound,
        ];
        let mut codes: Vec<&str> = errors.iter().map(ServerError::error_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&"REQUEST_TIMEOUT"));
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let err: ServerError = MatchError::InvalidInput("title must not be empty".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn provider_config_errors_are_internal() {
        let err: ServerError = SemanticError::InvalidConfig("no key".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
