//! Desk source: files attached to one personality, scored in-process.
//!
//! The desk table has no vector index, so a bounded candidate set is fetched and each
//! candidate is scored with a [`VectorScorer`].

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;

use crate::memory::backend::{DeskCandidate, DeskStore};
use crate::memory::similarity::{CosineScorer, VectorScorer};
use crate::memory::types::{MemoryResult, MemorySource, Metadata};

/// Upper bound on candidates pulled per personality.
pub const DEFAULT_MAX_CANDIDATES: usize = 500;

pub struct DeskAdapter {
    store: Arc<dyn DeskStore>,
    scorer: Arc<dyn VectorScorer>,
    max_candidates: usize,
}

impl DeskAdapter {
    pub fn new(store: Arc<dyn DeskStore>) -> Self {
        Self {
            store,
            scorer: Arc::new(CosineScorer),
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn VectorScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates.max(1);
        self
    }

    /// Candidates for `personality_id` scoring ≥ `threshold`, best first, at most `limit`.
    ///
    /// Never fails: a store error is logged and yields an empty list.
    pub async fn search(
        &self,
        embedding: Arc<[f32]>,
        personality_id: &str,
        limit: usize,
        threshold: f64,
    ) -> Vec<MemoryResult> {
        match self.try_search(&embedding, personality_id, limit, threshold).await {
            Ok(results) => {
                tracing::debug!(personality_id, count = results.len(), "desk search complete");
                results
            }
            Err(e) => {
                tracing::warn!(personality_id, error = %format!("{e:#}"), "desk search failed, skipping source");
                Vec::new()
            }
        }
    }

    async fn try_search(
        &self,
        embedding: &[f32],
        personality_id: &str,
        limit: usize,
        threshold: f64,
    ) -> Result<Vec<MemoryResult>> {
        let candidates = self
            .store
            .fetch_candidates(personality_id, self.max_candidates)
            .await?;
        let fetched = candidates.len();

        let mut scored: Vec<(f64, DeskCandidate)> = Vec::with_capacity(fetched);
        for candidate in candidates {
            match self.scorer.score(embedding, &candidate.embedding) {
                Ok(score) if score >= threshold => scored.push((score, candidate)),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        personality_id,
                        chunk_index = candidate.chunk_index,
                        error = %e,
                        "skipping desk chunk with unusable embedding"
                    );
                }
            }
        }

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(limit);

        tracing::trace!(fetched, kept = scored.len(), "desk candidates scored");
        Ok(scored
            .into_iter()
            .map(|(score, c)| to_result(score, c))
            .collect())
    }
}

fn to_result(score: f64, candidate: DeskCandidate) -> MemoryResult {
    let mut metadata = Metadata::new();
    metadata.insert("chunk_index".into(), json!(candidate.chunk_index));
    metadata.insert("created_at".into(), json!(candidate.created_at));
    if let Some(file_name) = candidate.file_name {
        metadata.insert("file_name".into(), json!(file_name));
    }
    MemoryResult::new(MemorySource::Desk, candidate.chunk_text, score, metadata)
}
