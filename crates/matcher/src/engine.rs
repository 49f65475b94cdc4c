use std::sync::Arc;
use std::time::Instant;

use semantic::{EmbeddingProvider, EmbeddingVector};
use tracing::{debug, info, warn};

use crate::reasoning::{build_reasoning, ReasoningContext};
use crate::similarity::{category_match, cosine_similarity, location_similarity};
use crate::types::{
    validate_threshold, CandidateComplaint, DuplicateConfig, DuplicateMatch, MatchError,
    NewComplaint, ReasoningThresholds, SignalScores, StoredEmbedding,
};


/// Duplicate detector for newly submitted complaints.
///
/// Holds no per-request state; a single instance can serve concurrent checks.
pub struct DuplicateMatcher {
    provider: Arc<dyn EmbeddingProvider>,
    config: DuplicateConfig,
}

impl DuplicateMatcher {
    /// Construct a matcher from an embedding provider and a validated config.
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        config: DuplicateConfig,
    ) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    /// Matcher with the default threshold and reasoning bands.
    pub fn with_defaults(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            config: DuplicateConfig::default(),
        }
    }

    pub fn config(&self) -> &DuplicateConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Embed a complaint with the same text template used for duplicate
    /// checks. Callers persist the result alongside the new complaint.
    pub async fn embed_complaint(
        &self,
        complaint: &NewComplaint,
    ) -> Result<EmbeddingVector, MatchError> {
        let vector = self.provider.embed(&complaint.embedding_text()).await?;
        Ok(vector)
    }

    /// Judge a complaint whose embedding the caller already holds, using the
    /// configured threshold. Lets a submission flow embed once for both the
    /// check and storage.
    pub fn match_embedded(
        &self,
        complaint: &NewComplaint,
        embedding: &[f32],
        candidates: &[CandidateComplaint],
    ) -> Option<DuplicateMatch> {
        find_best_match(
            complaint,
            embedding,
            candidates,
            self.config.threshold,
            &self.config.reasoning,
        )
    }

    /// Compare `complaint` against `candidates` using the configured threshold.
    pub async fn check_duplicate(
        &self,
        complaint: &NewComplaint,
        candidates: &[CandidateComplaint],
    ) -> Result<Option<DuplicateMatch>, MatchError> {
        self.check_duplicate_with_threshold(complaint, candidates, self.config.threshold)
            .await
    }

    /// Compare `complaint` against `candidates` with an explicit threshold.
    ///
    /// The provider is called at most once, and not at all for an empty
    /// candidate list. Provider failures propagate; unusable stored embeddings
    /// only exclude their candidate.
    pub async fn check_duplicate_with_threshold(
        &self,
        complaint: &NewComplaint,
        candidates: &[CandidateComplaint],
        threshold: f32,
    ) -> Result<Option<DuplicateMatch>, MatchError> {
        complaint.validate()?;
        validate_threshold(threshold)?;

        if candidates.is_empty() {
            debug!("no candidates supplied; skipping embedding");
            return Ok(None);
        }

        let start = Instant::now();
        let embedding = self.embed_complaint(complaint).await?;
        let result = find_best_match(
            complaint,
            &embedding,
            candidates,
            threshold,
            &self.config.reasoning,
        );

        info!(
            model = self.provider.model_name(),
            candidates = candidates.len(),
            duplicate = result.is_some(),
            best_score = result.as_ref().map(|m| m.similarity_score),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "duplicate check finished"
        );
        Ok(result)
    }
}

/// Why a candidate was left out of scoring.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    MissingEmbedding,
    MalformedEmbedding,
    DimensionMismatch { expected: usize, actual: usize },
}

/// Score one candidate against an already embedded complaint.
pub fn score_candidate(
    complaint: &NewComplaint,
    embedding: &[f32],
    candidate: &CandidateComplaint,
) -> Result<SignalScores, SkipReason> {
    let stored = match &candidate.embedding {
        StoredEmbedding::Valid(vector) => vector,
        StoredEmbedding::Missing => return Err(SkipReason::MissingEmbedding),
        StoredEmbedding::Malformed(_) => return Err(SkipReason::MalformedEmbedding),
    };

    let text = match cosine_similarity(embedding, stored) {
        Ok(score) => score,
        Err(MatchError::DimensionMismatch { expected, actual }) => {
            return Err(SkipReason::DimensionMismatch { expected, actual })
        }
        Err(_) => return Err(SkipReason::MalformedEmbedding),
    };

    Ok(SignalScores {
        text,
        location: location_similarity(&complaint.location, &candidate.location),
        category: category_match(&complaint.category, &candidate.category),
    })
}

/// Pick the highest-scoring candidate, keeping the first seen on ties, and
/// return it only if its fused score reaches `threshold`.
pub fn find_best_match(
    complaint: &NewComplaint,
    embedding: &[f32],
    candidates: &[CandidateComplaint],
    threshold: f32,
    bands: &ReasoningThresholds,
) -> Option<DuplicateMatch> {
    let mut best: Option<(&CandidateComplaint, SignalScores)> = None;
    let mut best_score = 0.0f32;
    let mut skipped = 0usize;

    for candidate in candidates {
        let signals = match score_candidate(complaint, embedding, candidate) {
            Ok(signals) => signals,
            Err(reason) => {
                skipped += 1;
                match reason {
                    SkipReason::DimensionMismatch { expected, actual } => warn!(
                        reference_id = %candidate.reference_id,
                        expected,
                        actual,
                        "stored embedding dimension mismatch; skipping candidate"
                    ),
                    other => debug!(
                        reference_id = %candidate.reference_id,
                        reason = ?other,
                        "skipping candidate without usable embedding"
                    ),
                }
                continue;
            }
        };

        let score = signals.combined();
        if score > best_score {
            best_score = score;
            best = Some((candidate, signals));
        }
    }

    debug!(
        scanned = candidates.len(),
        skipped,
        best_score,
        threshold,
        "candidate scan complete"
    );

    let (candidate, signals) = best?;
    if best_score < threshold {
        return None;
    }

    let reasoning = build_reasoning(
        best_score,
        signals,
        ReasoningContext {
            new_location: &complaint.location,
            existing_location: &candidate.location,
            new_category: &complaint.category,
            existing_category: &candidate.category,
        },
        bands,
    );

    Some(DuplicateMatch {
        complaint: candidate.clone(),
        similarity_score: best_score,
        text_similarity: signals.text,
        location_similarity: signals.location,
        category_match: signals.category,
        factor_scores: signals.factor_scores(),
        reasoning,
    })
}
