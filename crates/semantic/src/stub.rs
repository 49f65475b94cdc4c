use async_trait::async_trait;
use fxhash::hash64;

use crate::normalize::l2_normalize_in_place;
use crate::{EmbeddingProvider, EmbeddingVector, SemanticConfig, SemanticError};

/// Deterministic offline provider.
///
/// Produces a hashed bag-of-words vector: every lowercase alphanumeric token
/// adds 1.0 to the bucket `hash(token) % dimension`. Texts sharing vocabulary
/// therefore land close together under cosine similarity, which is enough for
/// local runs and tests without a network round trip.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    model_name: String,
    dimension: usize,
    normalize: bool,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            model_name: "stub-bow".into(),
            dimension,
            normalize: true,
        }
    }

    pub fn from_config(cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        if cfg.stub_dimension == 0 {
            return Err(SemanticError::InvalidConfig(
                "stub_dimension must be greater than zero".into(),
            ));
        }
        Ok(Self {
            model_name: format!("stub-bow-{}", cfg.stub_dimension),
            dimension: cfg.stub_dimension,
            normalize: cfg.normalize,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Synchronous variant used by [`EmbeddingProvider::embed`].
    pub fn embed_sync(&self, text: &str) -> EmbeddingVector {
        let mut v = vec![0f32; self.dimension];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = (hash64(token.as_bytes()) % self.dimension as u64) as usize;
            v[bucket] += 1.0;
        }
        if self.normalize {
            l2_normalize_in_place(&mut v);
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, SemanticError> {
        Ok(self.embed_sync(text))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
