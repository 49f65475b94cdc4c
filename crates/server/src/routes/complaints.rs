use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use crate::store::{make_reference_id, DuplicateLink, StoredComplaint};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use matcher::{
    ComplaintStatus, DuplicateMatch, FactorScores, NewComplaint, Priority, StoredEmbedding,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Attempts at drawing an unused reference id before giving up.
const REFERENCE_ID_ATTEMPTS: usize = 5;

/// Complaint submission body
#[derive(Debug, Clone, Deserialize)]
pub struct ComplaintCreate {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,

    #[serde(default)]
    pub priority: Priority,

    /// URLs of images uploaded beforehand
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl ComplaintCreate {
    /// Enforce field length limits, counted in characters.
    pub fn validate(&self) -> ServerResult<()> {
        check_length("title", &self.title, 5, 200)?;
        check_length("description", &self.description, 30, 5000)?;
        check_length("category", &self.category, 2, 100)?;
        check_length("location", &self.location, 3, 200)?;
        Ok(())
    }

    fn to_new_complaint(&self) -> NewComplaint {
        NewComplaint::new(
            self.title.as_str(),
            self.description.as_str(),
            self.category.as_str(),
            self.location.as_str(),
        )
    }
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> ServerResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ServerError::BadRequest(format!(
            "{field} must be between {min} and {max} characters (got {len})"
        )));
    }
    Ok(())
}

/// Public view of a stored complaint
#[derive(Debug, Serialize, Deserialize)]
pub struct ComplaintOut {
    pub id: Uuid,
    pub reference_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub priority: Priority,
    pub status: ComplaintStatus,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StoredComplaint> for ComplaintOut {
    fn from(row: StoredComplaint) -> Self {
        Self {
            id: row.id,
            reference_id: row.reference_id,
            title: row.title,
            description: row.description,
            category: row.category,
            location: row.location,
            priority: row.priority,
            status: row.status,
            image_urls: row.image_urls,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// The existing complaint a submission collided with
#[derive(Debug, Serialize, Deserialize)]
pub struct DuplicateMatchOut {
    pub complaint_id: Uuid,
    pub reference_id: String,
    pub title: String,
    pub category: String,
    pub location: String,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    /// Fused score as a percentage, one decimal place
    pub similarity_score: f32,
    pub reasoning: String,
    pub factor_scores: FactorScores,
}

impl From<DuplicateMatch> for DuplicateMatchOut {
    fn from(found: DuplicateMatch) -> Self {
        let similarity_score = found.similarity_percent();
        Self {
            complaint_id: found.complaint.id,
            reference_id: found.complaint.reference_id,
            title: found.complaint.title,
            category: found.complaint.category,
            location: found.complaint.location,
            status: found.complaint.status,
            created_at: found.complaint.created_at,
            similarity_score,
            reasoning: found.reasoning,
            factor_scores: found.factor_scores,
        }
    }
}

/// Outcome of a submission
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub is_duplicate: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_match: Option<DuplicateMatchOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complaint: Option<ComplaintOut>,
}

/// Submit a complaint, rejecting it when it duplicates an existing one.
///
/// The submission is embedded once, before any lock is taken. That vector is
/// used for the duplicate check and, when the complaint is accepted, stored
/// with the new row so it can serve as a candidate for later submissions.
///
/// Loading candidates, matching and storing run under the state's submission
/// lock. Two identical submissions arriving together therefore register once
/// and the second is reported as its duplicate. The lock is per process; a
/// store shared between several server processes needs its own guard.
///
/// Returns `200 OK` with the matched complaint for a duplicate and
/// `201 Created` with the new complaint otherwise. An unavailable embedding
/// provider yields `503` and nothing is stored.
pub async fn submit_complaint(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ComplaintCreate>,
) -> ServerResult<impl IntoResponse> {
    request.validate()?;
    let start = Instant::now();
    let complaint = request.to_new_complaint();
    complaint.validate()?;

    let embedding = state.matcher.embed_complaint(&complaint).await?;

    let _guard = state.submissions.lock().await;
    let candidates = state.store.candidates(state.config.candidate_limit).await?;

    if let Some(found) = state
        .matcher
        .match_embedded(&complaint, &embedding, &candidates)
    {
        state
            .store
            .record_duplicate(DuplicateLink {
                id: Uuid::new_v4(),
                original_complaint_id: found.complaint.id,
                attempted_title: complaint.title.clone(),
                attempted_description: complaint.description.clone(),
                similarity_score: found.similarity_score,
                factor_scores: found.factor_scores,
                reasoning: found.reasoning.clone(),
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            original = %found.complaint.reference_id,
            score = found.similarity_score,
            candidates = candidates.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "submission rejected as duplicate"
        );

        return Ok((
            StatusCode::OK,
            Json(AnalysisResult {
                is_duplicate: true,
                message: "A similar complaint already exists in the system.".to_string(),
                duplicate_match: Some(found.into()),
                complaint: None,
            }),
        ));
    }

    let encoded = StoredEmbedding::encode(&embedding)?;
    let stored = insert_with_fresh_reference(&state, request, complaint, encoded).await?;

    tracing::info!(
        reference_id = %stored.reference_id,
        candidates = candidates.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "complaint registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(AnalysisResult {
            is_duplicate: false,
            message: "Complaint registered successfully.".to_string(),
            duplicate_match: None,
            complaint: Some(stored.into()),
        }),
    ))
}

async fn insert_with_fresh_reference(
    state: &ServerState,
    request: ComplaintCreate,
    complaint: NewComplaint,
    embedding: String,
) -> ServerResult<StoredComplaint> {
    let mut reference_id = None;
    for _ in 0..REFERENCE_ID_ATTEMPTS {
        let candidate = make_reference_id(Utc::now());
        if state.store.get_by_reference(&candidate).await?.is_none() {
            reference_id = Some(candidate);
            break;
        }
    }
    let reference_id = reference_id.ok_or_else(|| {
        ServerError::Storage("could not allocate a unique reference id".to_string())
    })?;

    let row = StoredComplaint::register(
        complaint,
        reference_id,
        request.priority,
        request.image_urls,
        Some(embedding),
    );
    state.store.insert(row).await
}

/// Look up a complaint by its public reference id (case-insensitive).
pub async fn track_complaint(
    State(state): State<Arc<ServerState>>,
    Path(reference_id): Path<String>,
) -> ServerResult<Json<ComplaintOut>> {
    let row = state
        .store
        .get_by_reference(reference_id.trim())
        .await?
        .ok_or(ServerError::NotFound)?;
    Ok(Json(row.into()))
}
