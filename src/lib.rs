//! Workspace umbrella crate for grievance duplicate detection.
//!
//! This crate re-exports the embedding layer (`semantic`) and the duplicate
//! matcher (`matcher`), and adds a YAML configuration format that wires the
//! two together so callers can build a ready-to-use [`DuplicateMatcher`] from
//! a single file.
//!
//! ```no_run
//! use grievance::{build_matcher, GrievanceConfig, NewComplaint};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GrievanceConfig::from_file("grievance.yaml")?;
//! let matcher = build_matcher(&config)?;
//!
//! let complaint = NewComplaint::new(
//!     "Garbage not collected",
//!     "Garbage has not been collected from our lane for ten days now",
//!     "Sanitation",
//!     "Ward 12, Lake Road",
//! );
//! let verdict = matcher.check_duplicate(&complaint, &[]).await?;
//! assert!(verdict.is_none());
//! # Ok(())
//! # }
//! ```

pub mod config;

pub use crate::config::{ConfigLoadError, GrievanceConfig, MatchYamlConfig, SemanticYamlConfig};

pub use matcher::{
    build_reasoning, combined_score, factor_scores, CandidateComplaint, ComplaintStatus,
    DuplicateConfig, DuplicateMatch, DuplicateMatcher, FactorScores, MatchError, NewComplaint,
    Priority, ReasoningThresholds, SignalScores, StoredEmbedding,
};
pub use semantic::{
    embedder_from_config, ApiEmbedder, EmbeddingProvider, EmbeddingVector, RetryConfig,
    SemanticConfig, SemanticError, StubEmbedder,
};

use thiserror::Error;

/// Errors raised while assembling a matcher from configuration.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("embedding provider setup failed: {0}")]
    Semantic(#[from] SemanticError),

    #[error("matcher setup failed: {0}")]
    Match(#[from] MatchError),
}

/// Build a [`DuplicateMatcher`] with the provider and thresholds described by
/// `config`.
pub fn build_matcher(config: &GrievanceConfig) -> Result<DuplicateMatcher, PipelineError> {
    let semantic_cfg = config.semantic_config()?;
    let provider = embedder_from_config(&semantic_cfg)?;
    tracing::info!(
        mode = %semantic_cfg.mode,
        model = provider.model_name(),
        threshold = config.matcher.threshold,
        "duplicate matcher configured"
    );
    let matcher = DuplicateMatcher::new(provider, config.duplicate_config())?;
    Ok(matcher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_stub_matcher_from_defaults() {
        let matcher = build_matcher(&GrievanceConfig::default()).unwrap();
        assert_eq!(matcher.config().threshold, 0.75);
        assert_eq!(matcher.provider().model_name(), "stub-bow-768");
    }

    #[test]
    fn api_mode_without_key_fails() {
        let config = GrievanceConfig {
            semantic: SemanticYamlConfig {
                mode: "api".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let Err(err) = build_matcher(&config) else {
            panic!("expected build_matcher to fail");
        };
        assert!(matches!(err, PipelineError::Config(ConfigLoadError::Validation(_))));
    }
}
