use std::sync::Arc;

use async_trait::async_trait;

use crate::{EmbeddingVector, SemanticError};

/// Capability that turns text into a dense embedding vector.
///
/// Implementations must be shareable across concurrent duplicate checks; the
/// matcher holds them behind an `Arc<dyn EmbeddingProvider>`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text. Network, quota, and model failures surface as
    /// [`SemanticError`].
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, SemanticError>;

    /// Model label for logs.
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T> EmbeddingProvider for Arc<T>
where
    T: EmbeddingProvider + ?Sized,
{
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, SemanticError> {
        (**self).embed(text).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
