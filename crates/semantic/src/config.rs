use serde::{Deserialize, Serialize};

use crate::retry::RetryConfig;
use crate::SemanticError;

/// Runtime configuration describing which embedding provider to build and how
/// to post-process its vectors.
///
/// # Example
/// ```no_run
/// use semantic::{embedder_from_config, SemanticConfig};
///
/// let cfg = SemanticConfig {
///     mode: "api".into(),
///     api_provider: Some("gemini".into()),
///     api_key: Some("AIza...".into()),
///     ..Default::default()
/// };
///
/// let embedder = embedder_from_config(&cfg).expect("valid config");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemanticConfig {
    /// Provider selector: `"api"` (remote HTTP) or `"stub"` (deterministic, offline).
    pub mode: String,
    /// Model identifier sent to the provider and surfaced in logs.
    pub model_name: String,
    /// Remote provider hint: `"gemini"` (default), `"openai"`, `"hf"`, or `"custom"`.
    pub api_provider: Option<String>,
    /// Explicit endpoint. When absent the Gemini `embedContent` URL for
    /// [`model_name`](Self::model_name) is used.
    pub api_url: Option<String>,
    /// API key or bearer token for the provider.
    pub api_key: Option<String>,
    /// Gemini task type hint.
    pub task_type: String,
    /// Overall request timeout in seconds.
    pub api_timeout_secs: Option<u64>,
    /// Dimension of vectors produced by the stub provider.
    pub stub_dimension: usize,
    /// Normalize vectors to unit length before returning them.
    pub normalize: bool,
    /// Retry policy for transient API failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_config: Option<RetryConfig>,
    /// Disable to surface the first transient failure directly.
    pub enable_retry: bool,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            mode: "stub".into(),
            model_name: "text-embedding-004".into(),
            api_provider: None,
            api_url: None,
            api_key: None,
            task_type: "RETRIEVAL_DOCUMENT".into(),
            api_timeout_secs: Some(30),
            stub_dimension: 768,
            normalize: true,
            retry_config: None,
            enable_retry: true,
        }
    }
}

impl SemanticConfig {
    /// Endpoint the API provider will POST to.
    pub fn resolved_api_url(&self) -> String {
        match self.api_url.as_deref() {
            Some(url) => url.to_string(),
            None => format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:embedContent",
                self.model_name
            ),
        }
    }

    pub fn validate(&self) -> Result<(), SemanticError> {
        match self.mode.as_str() {
            "stub" => {
                if self.stub_dimension == 0 {
                    return Err(SemanticError::InvalidConfig(
                        "stub_dimension must be greater than zero".into(),
                    ));
                }
            }
            "api" => {
                if self.model_name.trim().is_empty() {
                    return Err(SemanticError::InvalidConfig(
                        "model_name must not be empty".into(),
                    ));
                }
                let provider = self.api_provider.as_deref().unwrap_or("gemini");
                if provider.eq_ignore_ascii_case("gemini") && self.api_key.is_none() {
                    return Err(SemanticError::InvalidConfig(
                        "api_key is required for the gemini provider".into(),
                    ));
                }
            }
            other => {
                return Err(SemanticError::InvalidConfig(format!(
                    "unknown semantic mode '{other}', expected 'api' or 'stub'"
                )))
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = SemanticConfig::default();
        assert_eq!(cfg.mode, "stub");
        assert_eq!(cfg.model_name, "text-embedding-004");
        assert_eq!(cfg.task_type, "RETRIEVAL_DOCUMENT");
        assert_eq!(cfg.api_timeout_secs, Some(30));
        assert_eq!(cfg.stub_dimension, 768);
        assert!(cfg.normalize);
        assert!(cfg.enable_retry);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn gemini_url_derived_from_model() {
        let cfg = SemanticConfig::default();
        assert_eq!(
            cfg.resolved_api_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/text-embedding-004:embedContent"
        );

        let custom = SemanticConfig {
            api_url: Some("http://localhost:9000/embed".into()),
            ..Default::default()
        };
        assert_eq!(custom.resolved_api_url(), "http://localhost:9000/embed");
    }

    #[test]
    fn gemini_requires_api_key() {
        let cfg = SemanticConfig {
            mode: "api".into(),
            ..Default::default()
        };
        let err = cfg.validate().expect_err("missing key should be rejected");
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn custom_provider_without_key_is_valid() {
        let cfg = SemanticConfig {
            mode: "api".into(),
            api_provider: Some("custom".into()),
            api_url: Some("http://localhost:9000/embed".into()),
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unknown_mode_rejected() {
        let cfg = SemanticConfig {
            mode: "onnx".into(),
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SemanticError::InvalidConfig(msg)) if msg.contains("onnx")
        ));
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = SemanticConfig {
            mode: "api".into(),
            api_provider: Some("openai".into()),
            api_url: Some("https://api.example.com/v1/embeddings".into()),
            api_key: Some("sk-test".into()),
            retry_config: Some(RetryConfig::default()),
            ..Default::default()
        };

        let serialized = serde_json::to_string(&cfg).unwrap();
        let deserialized: SemanticConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(cfg, deserialized);
    }
}
