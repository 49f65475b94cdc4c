//! YAML configuration for the duplicate-detection pipeline
//!
//! A single file describes how complaints are embedded and how candidates are
//! judged, so the same settings can be shared by the HTTP service, batch jobs,
//! and tests.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "municipal-grievances"
//!
//! semantic:
//!   mode: "api"
//!   api_provider: "gemini"
//!   model_name: "text-embedding-004"
//!   api_key_env: "GEMINI_API_KEY"
//!   api_timeout_secs: 30
//!   max_retries: 2
//!
//! matcher:
//!   threshold: 0.75
//!   candidate_limit: 500
//!   reasoning:
//!     text_high: 0.70
//!     text_notable: 0.50
//!     location_same: 0.60
//!     location_nearby: 0.30
//! ```

use std::fs;
use std::path::Path;

use matcher::{DuplicateConfig, ReasoningThresholds};
use semantic::{RetryConfig, SemanticConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Top-level YAML configuration for the duplicate-detection pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GrievanceConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Embedding provider configuration
    #[serde(default)]
    pub semantic: SemanticYamlConfig,

    /// Duplicate matcher configuration
    #[serde(default)]
    pub matcher: MatchYamlConfig,
}

impl GrievanceConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: GrievanceConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.semantic.validate()?;
        self.matcher.validate()?;
        Ok(())
    }

    /// Provider settings, with the API key resolved from the environment when
    /// `api_key_env` is set and no inline key is given.
    pub fn semantic_config(&self) -> Result<SemanticConfig, ConfigLoadError> {
        self.semantic.to_semantic_config()
    }

    pub fn duplicate_config(&self) -> DuplicateConfig {
        self.matcher.to_duplicate_config()
    }
}

impl Default for GrievanceConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            semantic: SemanticYamlConfig::default(),
            matcher: MatchYamlConfig::default(),
        }
    }
}

/// Embedding provider YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticYamlConfig {
    #[serde(default = "default_mode")]
    pub mode: String,

    #[serde(default = "default_model_name")]
    pub model_name: String,

    #[serde(default)]
    pub api_provider: Option<String>,

    #[serde(default)]
    pub api_url: Option<String>,

    /// Inline key. Prefer `api_key_env` outside of local testing.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Name of the environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,

    #[serde(default = "default_task_type")]
    pub task_type: String,

    #[serde(default = "default_timeout")]
    pub api_timeout_secs: Option<u64>,

    #[serde(default = "default_stub_dimension")]
    pub stub_dimension: usize,

    #[serde(default = "true_value")]
    pub normalize: bool,

    #[serde(default = "true_value")]
    pub enable_retry: bool,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl SemanticYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        let valid_modes = ["api", "stub"];
        if !valid_modes.contains(&self.mode.as_str()) {
            return Err(ConfigLoadError::Validation(format!(
                "semantic.mode must be one of: {valid_modes:?}"
            )));
        }
        if self.mode == "stub" && self.stub_dimension == 0 {
            return Err(ConfigLoadError::Validation(
                "semantic.stub_dimension must be >= 1".to_string(),
            ));
        }
        if self.model_name.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "semantic.model_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn to_semantic_config(&self) -> Result<SemanticConfig, ConfigLoadError> {
        let api_key = match (&self.api_key, &self.api_key_env) {
            (Some(key), _) => Some(key.clone()),
            (None, Some(var)) => match std::env::var(var) {
                Ok(key) => Some(key),
                Err(_) if self.mode == "api" => {
                    return Err(ConfigLoadError::MissingField(format!(
                        "environment variable {var} (semantic.api_key_env)"
                    )))
                }
                Err(_) => None,
            },
            (None, None) => None,
        };

        let cfg = SemanticConfig {
            mode: self.mode.clone(),
            model_name: self.model_name.clone(),
            api_provider: self.api_provider.clone(),
            api_url: self.api_url.clone(),
            api_key,
            task_type: self.task_type.clone(),
            api_timeout_secs: self.api_timeout_secs,
            stub_dimension: self.stub_dimension,
            normalize: self.normalize,
            retry_config: Some(RetryConfig::default().with_max_retries(self.max_retries)),
            enable_retry: self.enable_retry,
        };
        cfg.validate()
            .map_err(|e| ConfigLoadError::Validation(format!("semantic: {e}")))?;
        Ok(cfg)
    }
}

impl Default for SemanticYamlConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            model_name: default_model_name(),
            api_provider: None,
            api_url: None,
            api_key: None,
            api_key_env: None,
            task_type: default_task_type(),
            api_timeout_secs: default_timeout(),
            stub_dimension: default_stub_dimension(),
            normalize: true,
            enable_retry: true,
            max_retries: default_max_retries(),
        }
    }
}

/// Matcher YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchYamlConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Upper bound on stored complaints compared per submission.
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,

    #[serde(default)]
    pub reasoning: ReasoningThresholds,
}

impl MatchYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.candidate_limit == 0 {
            return Err(ConfigLoadError::Validation(
                "matcher.candidate_limit must be >= 1".to_string(),
            ));
        }
        self.to_duplicate_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("matcher: {e}")))
    }

    fn to_duplicate_config(&self) -> DuplicateConfig {
        DuplicateConfig {
            threshold: self.threshold,
            reasoning: self.reasoning,
        }
    }
}

impl Default for MatchYamlConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            candidate_limit: default_candidate_limit(),
            reasoning: ReasoningThresholds::default(),
        }
    }
}

// Helper functions for serde defaults
fn true_value() -> bool {
    true
}
fn default_mode() -> String {
    "stub".to_string()
}
fn default_model_name() -> String {
    "text-embedding-004".to_string()
}
fn default_task_type() -> String {
    "RETRIEVAL_DOCUMENT".to_string()
}
fn default_timeout() -> Option<u64> {
    Some(30)
}
fn default_stub_dimension() -> usize {
    768
}
fn default_max_retries() -> u32 {
    2
}
fn default_threshold() -> f32 {
    0.75
}
fn default_candidate_limit() -> usize {
    500
}
