//! Store traits the source adapters read through, plus the rows they return.
//!
//! Each trait captures one access pattern: similarity-ranked retrieval with a visibility
//! filter (library), bulk fetch of a small candidate set (desk), and substring filtering
//! with ordering and limit (diary). [`SqliteMemoryStore`](crate::memory::sqlite::SqliteMemoryStore)
//! implements all three.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// Similarity search over library chunks.
#[derive(Debug, Clone)]
pub struct LibrarySearch {
    pub embedding: Arc<[f32]>,
    pub user_id: String,
    pub project_id: Option<String>,
    pub limit: usize,
    pub threshold: f64,
}

/// A library chunk returned by the store, already scored.
#[derive(Debug, Clone)]
pub struct LibraryChunk {
    pub id: String,
    pub content: String,
    pub similarity: f64,
    pub file_name: Option<String>,
    pub created_at: String,
    pub metadata: Option<serde_json::Value>,
}

/// A desk chunk together with its stored embedding, unscored.
#[derive(Debug, Clone)]
pub struct DeskCandidate {
    pub chunk_text: String,
    pub embedding: Vec<f32>,
    pub chunk_index: i64,
    pub file_name: Option<String>,
    pub created_at: String,
}

/// Lexical diary search parameters shared by the three record kinds.
#[derive(Debug, Clone)]
pub struct DiarySearch {
    pub text: String,
    pub project_id: Option<String>,
    pub limit: usize,
}

#[derive(Debug, Clone)]
pub struct FactRow {
    pub subject: String,
    pub value: serde_json::Value,
    pub importance: i64,
    pub tags: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub summary_text: String,
    pub keywords: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct DecisionRow {
    pub decision_text: String,
    pub decision_type: Option<String>,
    pub priority: Option<String>,
    pub tags: Option<serde_json::Value>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: String,
}

#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Chunks visible to `user_id` (public or owned), with similarity ≥ threshold,
    /// best first, at most `limit`. Filtering happens in the store.
    async fn search_chunks(&self, search: LibrarySearch) -> Result<Vec<LibraryChunk>>;
}

#[async_trait]
pub trait DeskStore: Send + Sync {
    /// Up to `max_candidates` chunks belonging to `personality_id`.
    async fn fetch_candidates(
        &self,
        personality_id: &str,
        max_candidates: usize,
    ) -> Result<Vec<DeskCandidate>>;
}

#[async_trait]
pub trait DiaryStore: Send + Sync {
    /// Active facts whose subject contains the text, by importance then recency.
    async fn search_facts(&self, search: &DiarySearch) -> Result<Vec<FactRow>>;

    /// Summaries whose text contains the search text, newest first.
    async fn search_summaries(&self, search: &DiarySearch) -> Result<Vec<SummaryRow>>;

    /// Decisions whose text contains the search text, newest first.
    async fn search_decisions(&self, search: &DiarySearch) -> Result<Vec<DecisionRow>>;
}
