use thiserror::Error;

/// Errors surfaced by an [`EmbeddingProvider`](crate::EmbeddingProvider).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SemanticError {
    /// Configuration is inconsistent (e.g., api mode without an API key).
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("embedding request failed: {0}")]
    Request(String),
    /// The provider rejected the request because of quota or rate limits.
    #[error("embedding quota exceeded: {0}")]
    QuotaExceeded(String),
    /// The provider answered with a non-success status.
    #[error("embedding provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// The provider answered but the payload did not contain a usable vector.
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
}

impl SemanticError {
    /// Whether the failure is transient and worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            SemanticError::Request(_) | SemanticError::QuotaExceeded(_) => true,
            SemanticError::Http { status, .. } => {
                matches!(*status, 408 | 500 | 502 | 503 | 504)
            }
            SemanticError::InvalidConfig(_) | SemanticError::InvalidResponse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_config() {
        let err = SemanticError::InvalidConfig("missing api key".into());
        assert!(err.to_string().contains("invalid semantic config"));
        assert!(err.to_string().contains("missing api key"));
    }

    #[test]
    fn error_http_includes_status_and_body() {
        let err = SemanticError::Http {
            status: 403,
            body: "forbidden".into(),
        };
        assert_eq!(
            err.to_string(),
            "embedding provider returned HTTP 403: forbidden"
        );
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(SemanticError::Request("timed out".into()).is_retryable());
        assert!(SemanticError::QuotaExceeded("429".into()).is_retryable());
        assert!(SemanticError::Http {
            status: 503,
            body: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn permanent_errors_are_not_retryable() {
        assert!(!SemanticError::InvalidConfig("x".into()).is_retryable());
        assert!(!SemanticError::InvalidResponse("x".into()).is_retryable());
        for status in [400, 401, 403, 404] {
            let err = SemanticError::Http {
                status,
                body: String::new(),
            };
            assert!(!err.is_retryable(), "status {status} should be permanent");
        }
    }
}
