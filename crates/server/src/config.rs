use semantic::SemanticConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Minimum fused score for a submission to be rejected as a duplicate
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: f32,

    /// Maximum stored complaints compared per submission
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,

    /// Optional YAML pipeline config; overrides `semantic`,
    /// `duplicate_threshold` and `candidate_limit` when set
    #[serde(default)]
    pub pipeline_config: Option<String>,

    /// Embedding provider settings
    #[serde(default)]
    pub semantic: SemanticConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            duplicate_threshold: default_duplicate_threshold(),
            candidate_limit: default_candidate_limit(),
            pipeline_config: None,
            semantic: SemanticConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `server.*` file, and
    /// `GRIEVANCE_SERVER__*` environment variables (highest precedence).
    pub fn load() -> anyhow::Result<Self> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(
                config::Environment::with_prefix("GRIEVANCE_SERVER")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: ServerConfig = builder.build()?.try_deserialize()?;

        // Fall back to the conventional variable for the Gemini key.
        if config.semantic.api_key.is_none() {
            if let Ok(key) = std::env::var("GEMINI_API_KEY") {
                config.semantic.api_key = Some(key);
            }
        }

        if config.semantic.mode == "stub" {
            tracing::warn!("semantic.mode is 'stub'; embeddings are not model-backed");
        }

        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_duplicate_threshold() -> f32 {
    0.75
}

fn default_candidate_limit() -> usize {
    500
}
