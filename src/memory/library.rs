//! Library source: semantic search over the global document-chunk store.

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;

use crate::memory::backend::{LibraryChunk, LibrarySearch, LibraryStore};
use crate::memory::merge_metadata;
use crate::memory::types::{MemoryResult, MemorySource, Metadata};

pub struct LibraryAdapter {
    store: Arc<dyn LibraryStore>,
}

impl LibraryAdapter {
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self { store }
    }

    /// Chunks visible to `user_id` with similarity ≥ `threshold`, best first.
    ///
    /// Never fails: a store error is logged and yields an empty list.
    pub async fn search(
        &self,
        embedding: Arc<[f32]>,
        user_id: &str,
        project_id: Option<&str>,
        limit: usize,
        threshold: f64,
    ) -> Vec<MemoryResult> {
        let search = LibrarySearch {
            embedding,
            user_id: user_id.to_string(),
            project_id: project_id.map(String::from),
            limit,
            threshold,
        };

        match self.try_search(search).await {
            Ok(results) => {
                tracing::debug!(count = results.len(), "library search complete");
                results
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "library search failed, skipping source");
                Vec::new()
            }
        }
    }

    async fn try_search(&self, search: LibrarySearch) -> Result<Vec<MemoryResult>> {
        let (limit, threshold) = (search.limit, search.threshold);
        let chunks = self.store.search_chunks(search).await?;

        Ok(chunks
            .into_iter()
            .filter(|c| c.similarity >= threshold)
            .take(limit)
            .map(to_result)
            .collect())
    }
}

fn to_result(chunk: LibraryChunk) -> MemoryResult {
    let mut metadata = Metadata::new();
    metadata.insert("chunk_id".into(), json!(chunk.id));
    metadata.insert("file_name".into(), json!(chunk.file_name));
    metadata.insert("created_at".into(), json!(chunk.created_at));
    merge_metadata(&mut metadata, chunk.metadata);

    MemoryResult::new(MemorySource::Library, chunk.content, chunk.similarity, metadata)
}
