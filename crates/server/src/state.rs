use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::store::{ComplaintStore, InMemoryStore};
use grievance::{build_matcher, GrievanceConfig};
use matcher::{DuplicateConfig, DuplicateMatcher};
use semantic::embedder_from_config;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Duplicate matcher (shared across requests)
    pub matcher: Arc<DuplicateMatcher>,

    /// Complaint storage
    pub store: Arc<dyn ComplaintStore>,

    /// Held from the candidate load until the new row is stored, so two
    /// concurrent identical submissions cannot both register
    pub submissions: Arc<Mutex<()>>,
}

impl ServerState {
    /// Create new server state with an in-memory store.
    ///
    /// When `pipeline_config` points at a YAML file, the provider, threshold
    /// and candidate limit come from that file.
    pub fn new(mut config: ServerConfig) -> ServerResult<Self> {
        let matcher = match config.pipeline_config.as_deref() {
            Some(path) => {
                let pipeline = GrievanceConfig::from_file(path)?;
                config.duplicate_threshold = pipeline.matcher.threshold;
                config.candidate_limit = pipeline.matcher.candidate_limit;
                build_matcher(&pipeline)?
            }
            None => {
                let provider = embedder_from_config(&config.semantic)?;
                DuplicateMatcher::new(
                    provider,
                    DuplicateConfig::default().with_threshold(config.duplicate_threshold),
                )?
            }
        };

        tracing::info!(
            model = matcher.provider().model_name(),
            threshold = matcher.config().threshold,
            candidate_limit = config.candidate_limit,
            "duplicate matcher ready"
        );

        Ok(Self::with_components(
            config,
            Arc::new(matcher),
            Arc::new(InMemoryStore::new()),
        ))
    }

    /// Assemble state from prebuilt parts.
    pub fn with_components(
        config: ServerConfig,
        matcher: Arc<DuplicateMatcher>,
        store: Arc<dyn ComplaintStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            matcher,
            store,
            submissions: Arc::new(Mutex::new(())),
        }
    }
}

/// Server metadata for health checks
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub version: String,
    pub uptime_seconds: u64,
    pub embedding_model: String,
    pub duplicate_threshold: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_uses_stub_provider() {
        let state = ServerState::new(ServerConfig::default()).unwrap();
        assert_eq!(state.matcher.provider().model_name(), "stub-bow-768");
        assert_eq!(state.matcher.config().threshold, 0.75);
    }

    #[test]
    fn invalid_threshold_is_a_config_error() {
        let config = ServerConfig {
            duplicate_threshold: 3.0,
            ..Default::default()
        };
        assert!(ServerState::new(config).is_err());
    }

    #[test]
    fn missing_pipeline_file_is_a_config_error() {
        let config = ServerConfig {
            pipeline_config: Some("/nonexistent/grievance.yaml".into()),
            ..Default::default()
        };
        match ServerState::new(config) {
            Err(err) => assert_eq!(err.error_code(), "CONFIG_ERROR"),
            Ok(_) => panic!("expected a config error"),
        }
    }
}
