//! Embedding providers for grievance duplicate detection
//!
//! This crate turns complaint text into dense vectors. The duplicate matcher
//! never talks to a model directly; it receives an [`EmbeddingProvider`] at
//! construction time and calls it once per duplicate check.
//!
//! Two providers ship here:
//!
//! - **API mode** ([`ApiEmbedder`]) - calls a remote embedding endpoint. Gemini
//!   `embedContent` is the default, OpenAI / Hugging Face / a bare
//!   `{"text": ...}` protocol are also understood. Transient failures
//!   (timeouts, 429, 5xx) are retried with exponential backoff.
//! - **Stub mode** ([`StubEmbedder`]) - deterministic hashed bag-of-words
//!   vectors. No network, same text always gives the same vector.
//!
//! Unlike a local-model fallback, API failures are never papered over with a
//! stub vector: a comparison against a fake embedding would be meaningless,
//! so the error is returned to the caller.
//!
//! ## Quick example
//!
//! ```no_run
//! use semantic::{embedder_from_config, SemanticConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let cfg = SemanticConfig {
//!         mode: "api".into(),
//!         api_key: std::env::var("GEMINI_API_KEY").ok(),
//!         ..Default::default()
//!     };
//!
//!     let embedder = embedder_from_config(&cfg).unwrap();
//!     let vector = embedder.embed("Streetlight out on 5th Avenue").await.unwrap();
//!     println!("dim = {}", vector.len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod retry;
mod serde_millis;

mod api;
mod normalize;
mod stub;

use std::sync::Arc;

pub use crate::api::ApiEmbedder;
pub use crate::config::SemanticConfig;
pub use crate::error::SemanticError;
pub use crate::provider::EmbeddingProvider;
pub use crate::retry::RetryConfig;
pub use crate::stub::StubEmbedder;

/// Dense embedding produced by a provider. Individual dimensions carry no
/// meaning on their own.
pub type EmbeddingVector = Vec<f32>;

/// Build the provider selected by `cfg.mode`.
pub fn embedder_from_config(
    cfg: &SemanticConfig,
) -> Result<Arc<dyn EmbeddingProvider>, SemanticError> {
    cfg.validate()?;
    match cfg.mode.as_str() {
        "api" => Ok(Arc::new(ApiEmbedder::new(cfg.clone())?)),
        _ => Ok(Arc::new(StubEmbedder::from_config(cfg)?)),
    }
}
