//! # Complaint Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` decides whether a newly submitted grievance duplicates one that
//! is already on file. It compares the new complaint against a batch of stored
//! candidates and returns the single best match when its fused score clears a
//! configurable threshold, together with a human-readable explanation.
//!
//! Storage is not this crate's concern: callers fetch candidates (typically
//! every non-rejected complaint, capped at a few hundred) and persist the new
//! complaint afterwards using [`DuplicateMatcher::embed_complaint`].
//!
//! ## Signals
//!
//! Each candidate is scored on three signals:
//!
//! - **text** - cosine similarity between the new complaint's embedding and
//!   the stored one ([`similarity::cosine_similarity`]).
//! - **location** - token overlap of the normalized location strings
//!   ([`similarity::location_similarity`]).
//! - **category** - trimmed, case-insensitive equality
//!   ([`similarity::category_match`]).
//!
//! [`scoring::combined_score`] fuses them with fixed weights
//! `0.60 / 0.30 / 0.10`.
//!
//! ## Core Types
//!
//! - [`NewComplaint`]: the submission under test.
//! - [`CandidateComplaint`]: a stored complaint plus its [`StoredEmbedding`].
//! - [`DuplicateConfig`]: duplicate threshold (default `0.75`) and the
//!   [`ReasoningThresholds`] that pick explanation wording.
//! - [`DuplicateMatch`]: the winning candidate, its scores, and reasoning.
//! - [`DuplicateMatcher`]: the engine; wraps an injected
//!   [`semantic::EmbeddingProvider`].
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use matcher::{CandidateComplaint, DuplicateConfig, DuplicateMatcher, NewComplaint};
//! use semantic::StubEmbedder;
//!
//! # async fn run() -> Result<(), matcher::MatchError> {
//! let matcher = DuplicateMatcher::new(Arc::new(StubEmbedder::new(768)), DuplicateConfig::default())?;
//!
//! let complaint = NewComplaint::new(
//!     "Streetlight not working",
//!     "The streetlight outside house 42 has been off for two weeks",
//!     "Electricity",
//!     "Sector 5, Green Park",
//! );
//!
//! let candidates: Vec<CandidateComplaint> = Vec::new(); // loaded from storage
//! if let Some(found) = matcher.check_duplicate(&complaint, &candidates).await? {
//!     println!("{} ({:.1}%)", found.complaint.reference_id, found.similarity_score * 100.0);
//!     println!("{}", found.reasoning);
//! }
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod normalize;
pub mod reasoning;
pub mod scoring;
pub mod similarity;
pub mod types;

pub use crate::engine::{find_best_match, score_candidate, DuplicateMatcher, SkipReason};
pub use crate::reasoning::{build_reasoning, ReasoningContext};
pub use crate::scoring::{combined_score, factor_scores};
pub use crate::types::{
    CandidateComplaint, ComplaintStatus, DuplicateConfig, DuplicateMatch, FactorScores,
    MatchError, NewComplaint, Priority, ReasoningThresholds, SignalScores, StoredEmbedding,
};
