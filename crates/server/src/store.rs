//! Complaint persistence used by the submission routes.
//!
//! Rows keep their embedding as serialized JSON text; it is decoded into a
//! [`StoredEmbedding`] only when a row is handed to the matcher.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use matcher::{
    CandidateComplaint, ComplaintStatus, FactorScores, NewComplaint, Priority, StoredEmbedding,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ServerResult;

/// A persisted complaint row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredComplaint {
    pub id: Uuid,
    pub reference_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub priority: Priority,
    pub status: ComplaintStatus,
    pub image_urls: Vec<String>,
    /// JSON text of the embedding vector, absent for rows never embedded.
    #[serde(skip_serializing)]
    pub embedding: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredComplaint {
    /// New `registered` row for an accepted submission.
    pub fn register(
        complaint: NewComplaint,
        reference_id: String,
        priority: Priority,
        image_urls: Vec<String>,
        embedding: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            reference_id,
            title: complaint.title,
            description: complaint.description,
            category: complaint.category,
            location: complaint.location,
            priority,
            status: ComplaintStatus::Registered,
            image_urls,
            embedding,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_candidate(&self) -> CandidateComplaint {
        CandidateComplaint {
            id: self.id,
            reference_id: self.reference_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            location: self.location.clone(),
            status: self.status,
            created_at: self.created_at,
            embedding: StoredEmbedding::from_text(self.embedding.as_deref()),
        }
    }
}

/// Audit entry written when a submission is rejected as a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateLink {
    pub id: Uuid,
    pub original_complaint_id: Uuid,
    pub attempted_title: String,
    pub attempted_description: String,
    pub similarity_score: f32,
    pub factor_scores: FactorScores,
    pub reasoning: String,
    pub created_at: DateTime<Utc>,
}

/// `GRV-{year}-{5 digits}`.
pub fn make_reference_id(now: DateTime<Utc>) -> String {
    format!("GRV-{}-{:05}", now.year(), fastrand::u32(0..100_000))
}

/// Storage backend for complaints and duplicate audit records.
#[async_trait]
pub trait ComplaintStore: Send + Sync {
    /// Up to `limit` non-rejected complaints in insertion order.
    async fn candidates(&self, limit: usize) -> ServerResult<Vec<CandidateComplaint>>;

    async fn insert(&self, complaint: StoredComplaint) -> ServerResult<StoredComplaint>;

    async fn record_duplicate(&self, link: DuplicateLink) -> ServerResult<()>;

    /// Case-insensitive lookup by reference id.
    async fn get_by_reference(&self, reference_id: &str) -> ServerResult<Option<StoredComplaint>>;

    /// Number of stored complaints.
    async fn complaint_count(&self) -> usize;
}

/// Process-local store for development and tests.
#[derive(Default)]
pub struct InMemoryStore {
    complaints: RwLock<Vec<StoredComplaint>>,
    duplicate_links: RwLock<Vec<DuplicateLink>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn duplicate_links(&self) -> Vec<DuplicateLink> {
        self.duplicate_links.read().await.clone()
    }

    pub async fn set_status(&self, reference_id: &str, status: ComplaintStatus) -> bool {
        let mut complaints = self.complaints.write().await;
        match complaints
            .iter_mut()
            .find(|c| c.reference_id.eq_ignore_ascii_case(reference_id))
        {
            Some(row) => {
                row.status = status;
                row.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ComplaintStore for InMemoryStore {
    async fn candidates(&self, limit: usize) -> ServerResult<Vec<CandidateComplaint>> {
        let complaints = self.complaints.read().await;
        Ok(complaints
            .iter()
            .filter(|c| c.status.is_duplicate_candidate())
            .take(limit)
            .map(StoredComplaint::to_candidate)
            .collect())
    }

    async fn insert(&self, complaint: StoredComplaint) -> ServerResult<StoredComplaint> {
        let mut complaints = self.complaints.write().await;
        if complaints
            .iter()
            .any(|c| c.reference_id == complaint.reference_id)
        {
            return Err(crate::error::ServerError::Storage(format!(
                "reference id {} already exists",
                complaint.reference_id
            )));
        }
        complaints.push(complaint.clone());
        Ok(complaint)
    }

    async fn record_duplicate(&self, link: DuplicateLink) -> ServerResult<()> {
        self.duplicate_links.write().await.push(link);
        Ok(())
    }

    async fn get_by_reference(&self, reference_id: &str) -> ServerResult<Option<StoredComplaint>> {
        let complaints = self.complaints.read().await;
        Ok(complaints
            .iter()
            .find(|c| c.reference_id.eq_ignore_ascii_case(reference_id))
            .cloned())
    }

    async fn complaint_count(&self) -> usize {
        self.complaints.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(reference_id: &str, embedding: Option<&str>) -> StoredComplaint {
        StoredComplaint::register(
            NewComplaint::new(
                "Broken bench",
                "The bench in the park has been broken for a month",
                "Parks",
                "Central Park",
            ),
            reference_id.to_string(),
            Priority::Low,
            Vec::new(),
            embedding.map(str::to_string),
        )
    }

    #[test]
    fn reference_id_format() {
        let id = make_reference_id(Utc::now());
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "GRV");
        assert_eq!(parts[1], Utc::now().year().to_string());
        assert_eq!(parts[2].len(), 5);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn to_candidate_decodes_embedding_text() {
        assert_eq!(
            row("GRV-2025-00001", Some("[0.5, 0.5]")).to_candidate().embedding,
            StoredEmbedding::Valid(vec![0.5, 0.5])
        );
        assert_eq!(
            row("GRV-2025-00002", None).to_candidate().embedding,
            StoredEmbedding::Missing
        );
        assert!(matches!(
            row("GRV-2025-00003", Some("garbage")).to_candidate().embedding,
            StoredEmbedding::Malformed(_)
        ));
    }

    #[tokio::test]
    async fn candidates_exclude_rejected_and_respect_limit() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store
                .insert(row(&format!("GRV-2025-0000{i}"), Some("[1.0]")))
                .await
                .unwrap();
        }
        assert!(store.set_status("grv-2025-00001", ComplaintStatus::Rejected).await);

        let all = store.candidates(500).await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|c| c.reference_id != "GRV-2025-00001"));
        assert_eq!(all[0].reference_id, "GRV-2025-00000");

        let limited = store.candidates(2).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[1].reference_id, "GRV-2025-00002");
    }

    #[tokio::test]
    async fn duplicate_reference_ids_rejected() {
        let store = InMemoryStore::new();
        store.insert(row("GRV-2025-12345", None)).await.unwrap();
        assert!(store.insert(row("GRV-2025-12345", None)).await.is_err());
        assert_eq!(store.complaint_count().await, 1);
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let store = InMemoryStore::new();
        store.insert(row("GRV-2025-54321", None)).await.unwrap();
        let found = store.get_by_reference("grv-2025-54321").await.unwrap();
        assert_eq!(found.map(|c| c.reference_id), Some("GRV-2025-54321".into()));
        assert!(store.get_by_reference("GRV-2025-00000").await.unwrap().is_none());
    }
}
