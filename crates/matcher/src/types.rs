use chrono::{DateTime, Utc};
use semantic::SemanticError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle state of a stored complaint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    #[default]
    Registered,
    Verified,
    Assigned,
    InProgress,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    /// Rejected complaints never take part in duplicate detection.
    pub fn is_duplicate_candidate(self) -> bool {
        self != ComplaintStatus::Rejected
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// The complaint being submitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
}

impl NewComplaint {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: category.into(),
            location: location.into(),
        }
    }

    /// Minimal checks the matcher itself relies on. Field length limits for
    /// public submissions live at the HTTP layer.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.title.trim().is_empty() {
            return Err(MatchError::InvalidInput("title must not be empty".into()));
        }
        if self.description.trim().is_empty() {
            return Err(MatchError::InvalidInput(
                "description must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Text handed to the embedding provider. Stored embeddings were produced
    /// from the same template, so changing it invalidates them.
    pub fn embedding_text(&self) -> String {
        format!(
            "Category: {}. Location: {}. Title: {}. Description: {}",
            self.category, self.location, self.title, self.description
        )
    }
}

/// Embedding persisted alongside a stored complaint.
///
/// Storage keeps embeddings as JSON text; a row may predate embedding, or the
/// text may have been corrupted. Only [`StoredEmbedding::Valid`] vectors take
/// part in scoring.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StoredEmbedding {
    #[default]
    Missing,
    /// Raw text that did not decode to a numeric vector.
    Malformed(String),
    Valid(Vec<f32>),
}

impl StoredEmbedding {
    /// Decode the stored JSON text form. Empty text or an empty array count as
    /// missing.
    pub fn from_text(text: Option<&str>) -> Self {
        match text {
            None => StoredEmbedding::Missing,
            Some(raw) if raw.trim().is_empty() => StoredEmbedding::Missing,
            Some(raw) => match serde_json::from_str::<Vec<f32>>(raw) {
                Ok(vector) => StoredEmbedding::from_vector(vector),
                Err(_) => StoredEmbedding::Malformed(raw.to_string()),
            },
        }
    }

    pub fn from_vector(vector: Vec<f32>) -> Self {
        if vector.is_empty() {
            StoredEmbedding::Missing
        } else {
            StoredEmbedding::Valid(vector)
        }
    }

    /// Encode a freshly computed embedding into its stored JSON text form.
    pub fn encode(vector: &[f32]) -> Result<String, serde_json::Error> {
        serde_json::to_string(vector)
    }

    pub fn as_vector(&self) -> Option<&[f32]> {
        match self {
            StoredEmbedding::Valid(vector) => Some(vector),
            _ => None,
        }
    }

    fn from_json_value(value: Option<JsonValue>) -> Self {
        match value {
            None | Some(JsonValue::Null) => StoredEmbedding::Missing,
            Some(JsonValue::String(raw)) => StoredEmbedding::from_text(Some(&raw)),
            Some(other @ JsonValue::Array(_)) => {
                match serde_json::from_value::<Vec<f32>>(other.clone()) {
                    Ok(vector) => StoredEmbedding::from_vector(vector),
                    Err(_) => StoredEmbedding::Malformed(other.to_string()),
                }
            }
            Some(other) => StoredEmbedding::Malformed(other.to_string()),
        }
    }
}

impl Serialize for StoredEmbedding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StoredEmbedding::Missing => serializer.serialize_none(),
            StoredEmbedding::Malformed(raw) => serializer.serialize_str(raw),
            StoredEmbedding::Valid(vector) => vector.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for StoredEmbedding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<JsonValue>::deserialize(deserializer)?;
        Ok(StoredEmbedding::from_json_value(value))
    }
}

/// A previously stored complaint eligible for comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateComplaint {
    pub id: Uuid,
    pub reference_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    #[serde(default)]
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub embedding: StoredEmbedding,
}

/// Raw per-candidate similarity signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalScores {
    /// Cosine similarity of the embeddings.
    pub text: f32,
    /// Token overlap of the normalized locations, in [0, 1].
    pub location: f32,
    pub category: bool,
}

/// Display form of the signals: text and location as percentages rounded to
/// one decimal, category as 100.0 or 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorScores {
    pub text_similarity: f32,
    pub location_match: f32,
    pub category_match: f32,
}

/// The best-scoring candidate that met the duplicate threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    pub complaint: CandidateComplaint,
    /// Fused score in [0, 1].
    pub similarity_score: f32,
    pub text_similarity: f32,
    pub location_similarity: f32,
    pub category_match: bool,
    pub factor_scores: FactorScores,
    pub reasoning: String,
}

impl DuplicateMatch {
    /// Fused score as a percentage with one decimal place.
    pub fn similarity_percent(&self) -> f32 {
        crate::scoring::as_percent(self.similarity_score)
    }
}

/// Display thresholds for the reasoning fragments. These only pick wording;
/// they never affect the duplicate decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReasoningThresholds {
    #[serde(default = "ReasoningThresholds::default_text_high")]
    pub text_high: f32,
    #[serde(default = "ReasoningThresholds::default_text_notable")]
    pub text_notable: f32,
    #[serde(default = "ReasoningThresholds::default_location_same")]
    pub location_same: f32,
    #[serde(default = "ReasoningThresholds::default_location_nearby")]
    pub location_nearby: f32,
}

impl ReasoningThresholds {
    pub(crate) fn default_text_high() -> f32 {
        0.70
    }

    pub(crate) fn default_text_notable() -> f32 {
        0.50
    }

    pub(crate) fn default_location_same() -> f32 {
        0.60
    }

    pub(crate) fn default_location_nearby() -> f32 {
        0.30
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        for (name, value) in [
            ("text_high", self.text_high),
            ("text_notable", self.text_notable),
            ("location_same", self.location_same),
            ("location_nearby", self.location_nearby),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MatchError::InvalidConfig(format!(
                    "reasoning.{name} must be between 0.0 and 1.0"
                )));
            }
        }
        if self.text_notable > self.text_high {
            return Err(MatchError::InvalidConfig(
                "reasoning.text_notable must not exceed reasoning.text_high".into(),
            ));
        }
        if self.location_nearby > self.location_same {
            return Err(MatchError::InvalidConfig(
                "reasoning.location_nearby must not exceed reasoning.location_same".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ReasoningThresholds {
    fn default() -> Self {
        Self {
            text_high: Self::default_text_high(),
            text_notable: Self::default_text_notable(),
            location_same: Self::default_location_same(),
            location_nearby: Self::default_location_nearby(),
        }
    }
}

/// Configuration for duplicate checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuplicateConfig {
    /// Minimum fused score for a candidate to count as a duplicate.
    #[serde(default = "DuplicateConfig::default_threshold")]
    pub threshold: f32,
    #[serde(default)]
    pub reasoning: ReasoningThresholds,
}

impl DuplicateConfig {
    pub(crate) fn default_threshold() -> f32 {
        0.75
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        validate_threshold(self.threshold)?;
        self.reasoning.validate()
    }
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            threshold: Self::default_threshold(),
            reasoning: ReasoningThresholds::default(),
        }
    }
}

pub(crate) fn validate_threshold(threshold: f32) -> Result<(), MatchError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(MatchError::InvalidConfig(
            "threshold must be between 0.0 and 1.0".into(),
        ));
    }
    Ok(())
}

/// Errors produced by the matching layer.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Invalid configuration (per-request or global).
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// The submitted complaint is unusable.
    #[error("invalid complaint: {0}")]
    InvalidInput(String),
    /// Embedding the submitted complaint failed.
    #[error("embedding provider error: {0}")]
    EmbeddingProvider(#[from] SemanticError),
    /// Two embeddings of different lengths were compared.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
