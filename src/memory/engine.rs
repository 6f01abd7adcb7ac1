//! Unified memory query engine: fan out to the source adapters, fan in, rank, truncate.
//!
//! The pipeline for [`UnifiedMemoryQueryEngine::search_memory`]:
//!
//! 1. Validate the query and resolve which sources will actually run (desk needs a
//!    personality).
//! 2. Embed the query once if library or desk runs.
//! 3. Dispatch the adapters concurrently, each behind its own deadline.
//! 4. Flatten, stable-sort by descending relevance, record the pre-truncation count,
//!    truncate to `limit`.
//!
//! Adapter failures and timeouts degrade to an empty contribution. Only validation,
//! a missing embedding provider and embedding failures abort the call.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::{join_all, BoxFuture, FutureExt};

use crate::config::RetrievalConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::MemoryError;
use crate::memory::backend::{DeskStore, DiaryStore, LibraryStore};
use crate::memory::desk::DeskAdapter;
use crate::memory::diary::DiaryAdapter;
use crate::memory::library::LibraryAdapter;
use crate::memory::sqlite::SqliteMemoryStore;
use crate::memory::types::{
    MemoryQuery, MemoryResult, MemorySource, SearchMetadata, UnifiedMemoryResult,
};

/// Defaults and limits applied to every query.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub default_limit: usize,
    pub default_threshold: f64,
    pub desk_candidate_limit: usize,
    /// Bounds how long a search waits on each source; `None` waits for completion.
    ///
    /// The deadline bounds the caller's wait, not the backend work. A SQLite query already
    /// handed to the blocking pool keeps running and keeps holding the shared connection
    /// until it finishes, so later queries still queue behind it.
    pub adapter_timeout: Option<Duration>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from(&RetrievalConfig::default())
    }
}

impl From<&RetrievalConfig> for EngineOptions {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            default_limit: config.default_limit.max(1),
            default_threshold: config.similarity_threshold.clamp(0.0, 1.0),
            desk_candidate_limit: config.desk_candidate_limit,
            adapter_timeout: match config.adapter_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        }
    }
}

pub struct UnifiedMemoryQueryEngine {
    embedding: Option<Arc<dyn EmbeddingProvider>>,
    library: LibraryAdapter,
    desk: DeskAdapter,
    diary: DiaryAdapter,
    options: EngineOptions,
}

/// A validated query with defaults applied and sources resolved.
#[derive(Debug)]
struct SearchPlan<'a> {
    text: &'a str,
    user_id: &'a str,
    personality_id: Option<&'a str>,
    project_id: Option<&'a str>,
    sources: Vec<MemorySource>,
    limit: usize,
    threshold: f64,
}

impl<'a> SearchPlan<'a> {
    fn resolve(query: &'a MemoryQuery, options: &EngineOptions) -> Result<Self, MemoryError> {
        let text = query.query.trim();
        if text.is_empty() {
            return Err(MemoryError::InvalidQuery("query must not be empty".into()));
        }
        if query.user_id.trim().is_empty() {
            return Err(MemoryError::InvalidQuery("user_id is required".into()));
        }

        let limit = query.limit.unwrap_or(options.default_limit);
        if limit == 0 {
            return Err(MemoryError::InvalidQuery("limit must be positive".into()));
        }

        let threshold = query
            .similarity_threshold
            .unwrap_or(options.default_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(MemoryError::InvalidQuery(format!(
                "similarity_threshold must be within [0, 1], got {threshold}"
            )));
        }

        let personality_id = query
            .personality_id
            .as_deref()
            .filter(|p| !p.trim().is_empty());
        let project_id = query.project_id.as_deref().filter(|p| !p.trim().is_empty());

        let requested: &[MemorySource] = match query.sources.as_deref() {
            Some(list) if !list.is_empty() => list,
            _ => &MemorySource::ALL,
        };

        // Canonical order, duplicates collapsed, desk only with a personality.
        let sources = MemorySource::ALL
            .into_iter()
            .filter(|s| requested.contains(s))
            .filter(|s| *s != MemorySource::Desk || personality_id.is_some())
            .collect();

        Ok(Self {
            text,
            user_id: query.user_id.as_str(),
            personality_id,
            project_id,
            sources,
            limit,
            threshold,
        })
    }

    fn needs_embedding(&self) -> bool {
        self.sources.iter().any(MemorySource::is_vector_scored)
    }
}

impl UnifiedMemoryQueryEngine {
    pub fn new(
        library: Arc<dyn LibraryStore>,
        desk: Arc<dyn DeskStore>,
        diary: Arc<dyn DiaryStore>,
        options: EngineOptions,
    ) -> Self {
        Self {
            embedding: None,
            library: LibraryAdapter::new(library),
            desk: DeskAdapter::new(desk).with_max_candidates(options.desk_candidate_limit),
            diary: DiaryAdapter::new(diary),
            options,
        }
    }

    /// Engine over a single SQLite store serving all three sources.
    pub fn with_sqlite(store: SqliteMemoryStore, config: &RetrievalConfig) -> Self {
        let store = Arc::new(store);
        Self::new(
            Arc::clone(&store) as Arc<dyn LibraryStore>,
            Arc::clone(&store) as Arc<dyn DeskStore>,
            store as Arc<dyn DiaryStore>,
            EngineOptions::from(config),
        )
    }

    pub fn with_embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding = Some(provider);
        self
    }

    /// Install (or replace) the embedding provider after construction.
    pub fn init_embedding(&mut self, provider: Arc<dyn EmbeddingProvider>) {
        self.embedding = Some(provider);
    }

    /// Search every requested source and return one ranked, truncated list.
    pub async fn search_memory(
        &self,
        query: &MemoryQuery,
    ) -> Result<UnifiedMemoryResult, MemoryError> {
        let started = Instant::now();
        let plan = SearchPlan::resolve(query, &self.options)?;

        tracing::debug!(
            query_len = plan.text.len(),
            sources = ?plan.sources,
            limit = plan.limit,
            threshold = plan.threshold,
            "search_memory"
        );

        let (embedding, embedding_time_ms) = if plan.needs_embedding() {
            let provider = self.embedding.as_ref().ok_or(MemoryError::NotInitialized)?;
            let embed_started = Instant::now();
            let vector = provider
                .embed(plan.text)
                .await
                .map_err(|e| MemoryError::Embedding(format!("{e:#}")))?;
            if vector.is_empty() {
                return Err(MemoryError::Embedding("provider returned an empty vector".into()));
            }
            (
                Some(Arc::<[f32]>::from(vector)),
                Some(embed_started.elapsed().as_millis() as u64),
            )
        } else {
            (None, None)
        };

        let mut branches: Vec<BoxFuture<'_, Vec<MemoryResult>>> = Vec::new();
        for &source in &plan.sources {
            let branch = match (source, embedding.clone(), plan.personality_id) {
                (MemorySource::Library, Some(emb), _) => self
                    .isolate(
                        source,
                        self.library.search(
                            emb,
                            plan.user_id,
                            plan.project_id,
                            plan.limit,
                            plan.threshold,
                        ),
                    )
                    .boxed(),
                (MemorySource::Desk, Some(emb), Some(personality_id)) => self
                    .isolate(
                        source,
                        self.desk
                            .search(emb, personality_id, plan.limit, plan.threshold),
                    )
                    .boxed(),
                (MemorySource::Diary, _, _) => self
                    .isolate(
                        source,
                        self.diary.search(plan.text, plan.project_id, plan.limit),
                    )
                    .boxed(),
                // Unreachable after plan resolution.
                _ => continue,
            };
            branches.push(branch);
        }

        let mut results: Vec<MemoryResult> = join_all(branches).await.into_iter().flatten().collect();

        rank(&mut results);
        let total_results = results.len();
        results.truncate(plan.limit);

        let search_time_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            sources = ?plan.sources,
            total_results,
            returned = results.len(),
            search_time_ms,
            "memory search complete"
        );

        Ok(UnifiedMemoryResult {
            query: query.query.clone(),
            results,
            sources_searched: plan.sources,
            total_results,
            metadata: SearchMetadata {
                embedding_time_ms,
                search_time_ms,
            },
        })
    }

    /// Apply the per-adapter deadline. A timed-out branch contributes nothing.
    async fn isolate<F>(&self, source: MemorySource, branch: F) -> Vec<MemoryResult>
    where
        F: Future<Output = Vec<MemoryResult>>,
    {
        match self.options.adapter_timeout {
            Some(limit) => match tokio::time::timeout(limit, branch).await {
                Ok(results) => results,
                Err(_) => {
                    tracing::warn!(
                        source = %source,
                        timeout_ms = limit.as_millis() as u64,
                        "source timed out, skipping"
                    );
                    Vec::new()
                }
            },
            None => branch.await,
        }
    }
}

/// Stable sort by descending relevance; ties keep fan-out order.
pub fn rank(results: &mut [MemoryResult]) {
    results.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
}
