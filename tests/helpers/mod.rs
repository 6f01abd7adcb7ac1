#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use unimem::db;
use unimem::embedding::{EmbeddingProvider, EMBEDDING_DIM};
use unimem::memory::backend::{
    DecisionRow, DeskCandidate, DeskStore, DiarySearch, DiaryStore, FactRow, LibraryChunk,
    LibrarySearch, LibraryStore, SummaryRow,
};

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::load_sqlite_vec();
    let conn = Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::migrations::run_migrations(&conn).unwrap();
    conn
}

/// Generate a deterministic 1536-dim embedding with a spike at position `seed`.
/// Distinct seeds produce orthogonal vectors.
pub fn test_embedding(seed: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIM];
    v[seed % EMBEDDING_DIM] = 1.0;
    v
}

/// Unit vector whose cosine similarity to `test_embedding(base)` is `similarity`,
/// leaning towards `test_embedding(other)` for the rest.
pub fn embedding_at(base: usize, other: usize, similarity: f32) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIM];
    v[base % EMBEDDING_DIM] = similarity;
    v[other % EMBEDDING_DIM] = (1.0 - similarity * similarity).sqrt();
    v
}

// ── Embedding providers ───────────────────────────────────────────────────────

/// Returns a fixed vector and counts calls.
pub struct CountingEmbedder {
    vector: Vec<f32>,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new(vector: Vec<f32>) -> Arc<Self> {
        Arc::new(Self {
            vector,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vector.clone())
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        anyhow::bail!("HTTP 429: rate limited")
    }
}

// ── Fake stores ───────────────────────────────────────────────────────────────

/// Behaviour shared by the fake stores.
#[derive(Default, Clone, Copy)]
pub enum Behaviour {
    #[default]
    Ok,
    Fail,
    Hang(Duration),
}

impl Behaviour {
    async fn apply(self) -> Result<()> {
        match self {
            Behaviour::Ok => Ok(()),
            Behaviour::Fail => anyhow::bail!("connection reset by peer"),
            Behaviour::Hang(d) => {
                tokio::time::sleep(d).await;
                Ok(())
            }
        }
    }
}

/// Library store that applies threshold and limit to a fixed set of scored chunks.
#[derive(Default)]
pub struct FakeLibrary {
    pub chunks: Vec<LibraryChunk>,
    pub behaviour: Behaviour,
    pub calls: AtomicUsize,
}

impl FakeLibrary {
    pub fn with(chunks: Vec<LibraryChunk>) -> Self {
        Self {
            chunks,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            behaviour: Behaviour::Fail,
            ..Default::default()
        }
    }
}

#[async_trait]
impl LibraryStore for FakeLibrary {
    async fn search_chunks(&self, search: LibrarySearch) -> Result<Vec<LibraryChunk>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.behaviour.apply().await?;
        let mut chunks: Vec<LibraryChunk> = self
            .chunks
            .iter()
            .filter(|c| c.similarity >= search.threshold)
            .cloned()
            .collect();
        chunks.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        chunks.truncate(search.limit);
        Ok(chunks)
    }
}

#[derive(Default)]
pub struct FakeDesk {
    pub candidates: Vec<DeskCandidate>,
    pub behaviour: Behaviour,
    pub calls: AtomicUsize,
}

impl FakeDesk {
    pub fn with(candidates: Vec<DeskCandidate>) -> Self {
        Self {
            candidates,
            ..Default::default()
        }
    }
}

#[async_trait]
impl DeskStore for FakeDesk {
    async fn fetch_candidates(
        &self,
        _personality_id: &str,
        max_candidates: usize,
    ) -> Result<Vec<DeskCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.behaviour.apply().await?;
        Ok(self.candidates.iter().take(max_candidates).cloned().collect())
    }
}

#[derive(Default)]
pub struct FakeDiary {
    pub facts: Vec<FactRow>,
    pub summaries: Vec<SummaryRow>,
    pub decisions: Vec<DecisionRow>,
    pub behaviour: Behaviour,
    pub calls: AtomicUsize,
}

#[async_trait]
impl DiaryStore for FakeDiary {
    async fn search_facts(&self, search: &DiarySearch) -> Result<Vec<FactRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.behaviour.apply().await?;
        Ok(self.facts.iter().take(search.limit).cloned().collect())
    }

    async fn search_summaries(&self, search: &DiarySearch) -> Result<Vec<SummaryRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.behaviour.apply().await?;
        Ok(self.summaries.iter().take(search.limit).cloned().collect())
    }

    async fn search_decisions(&self, search: &DiarySearch) -> Result<Vec<DecisionRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.behaviour.apply().await?;
        Ok(self.decisions.iter().take(search.limit).cloned().collect())
    }
}

// ── Row builders ──────────────────────────────────────────────────────────────

pub fn library_chunk(content: &str, similarity: f64) -> LibraryChunk {
    LibraryChunk {
        id: format!("chunk-{content}"),
        content: content.into(),
        similarity,
        file_name: Some("guide.md".into()),
        created_at: "2024-01-01T00:00:00Z".into(),
        metadata: None,
    }
}

pub fn desk_candidate(text: &str, embedding: Vec<f32>) -> DeskCandidate {
    DeskCandidate {
        chunk_text: text.into(),
        embedding,
        chunk_index: 0,
        file_name: Some("persona.txt".into()),
        created_at: "2024-01-01T00:00:00Z".into(),
    }
}

pub fn fact_row(subject: &str, importance: i64) -> FactRow {
    FactRow {
        subject: subject.into(),
        value: serde_json::json!("yes"),
        importance,
        tags: None,
        metadata: None,
        created_at: "2024-01-01T00:00:00Z".into(),
    }
}

pub fn summary_row(text: &str) -> SummaryRow {
    SummaryRow {
        summary_text: text.into(),
        keywords: None,
        metadata: None,
        created_at: "2024-01-01T00:00:00Z".into(),
    }
}

pub fn decision_row(text: &str, priority: &str) -> DecisionRow {
    DecisionRow {
        decision_text: text.into(),
        decision_type: None,
        priority: Some(priority.into()),
        tags: None,
        metadata: None,
        created_at: "2024-01-01T00:00:00Z".into(),
    }
}
