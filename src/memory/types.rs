//! Query and result types shared by the engine, adapters and outer surfaces.
//!
//! [`MemoryQuery`] is the single input to a search, [`MemoryResult`] the normalized unit every
//! source produces, and [`UnifiedMemoryResult`] the envelope handed back to callers.

use serde::{Deserialize, Serialize};

/// Open string → JSON mapping passed through from source rows.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// The three memory backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemorySource {
    /// Global document-chunk store, vector ranked by the backend.
    Library,
    /// Per-personality file embeddings, scored in-process.
    Desk,
    /// Facts, thread summaries and decisions, matched lexically.
    Diary,
}

impl MemorySource {
    /// All sources in fan-out order.
    pub const ALL: [MemorySource; 3] = [Self::Library, Self::Desk, Self::Diary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Library => "library",
            Self::Desk => "desk",
            Self::Diary => "diary",
        }
    }

    /// Whether this source needs the query embedding.
    pub fn is_vector_scored(&self) -> bool {
        matches!(self, Self::Library | Self::Desk)
    }
}

impl std::fmt::Display for MemorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemorySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "library" => Ok(Self::Library),
            "desk" => Ok(Self::Desk),
            "diary" => Ok(Self::Diary),
            _ => Err(format!("unknown memory source: {s}")),
        }
    }
}

/// One retrievable unit from any source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryResult {
    pub source: MemorySource,
    pub content: String,
    /// Ranking key in `[0.0, 1.0]`. Cosine similarity for library/desk, a heuristic weight
    /// for diary records.
    pub relevance: f64,
    pub metadata: Metadata,
}

impl MemoryResult {
    /// Build a result, clamping `relevance` into `[0.0, 1.0]` (NaN becomes `0.0`).
    pub fn new(
        source: MemorySource,
        content: impl Into<String>,
        relevance: f64,
        metadata: Metadata,
    ) -> Self {
        let relevance = if relevance.is_nan() {
            0.0
        } else {
            relevance.clamp(0.0, 1.0)
        };
        Self {
            source,
            content: content.into(),
            relevance,
            metadata,
        }
    }
}

/// Input to [`search_memory`](crate::memory::engine::UnifiedMemoryQueryEngine::search_memory).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryQuery {
    pub query: String,
    pub user_id: String,
    #[serde(default)]
    pub personality_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    /// Sources to search. `None` (or an empty list) means all three.
    #[serde(default)]
    pub sources: Option<Vec<MemorySource>>,
    /// Maximum results. Defaults to the engine's configured limit (10).
    #[serde(default)]
    pub limit: Option<usize>,
    /// Minimum similarity for vector-scored sources. Defaults to 0.5.
    #[serde(default)]
    pub similarity_threshold: Option<f64>,
}

impl MemoryQuery {
    pub fn new(query: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            user_id: user_id.into(),
            personality_id: None,
            project_id: None,
            sources: None,
            limit: None,
            similarity_threshold: None,
        }
    }

    pub fn personality(mut self, personality_id: impl Into<String>) -> Self {
        self.personality_id = Some(personality_id.into());
        self
    }

    pub fn project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn sources(mut self, sources: impl IntoIterator<Item = MemorySource>) -> Self {
        self.sources = Some(sources.into_iter().collect());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }
}

/// Diagnostic timings. Never used for ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchMetadata {
    /// Time spent generating the query embedding; `None` when no embedding was needed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_time_ms: Option<u64>,
    pub search_time_ms: u64,
}

/// Output envelope of a unified search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedMemoryResult {
    pub query: String,
    /// Sorted by descending relevance, at most `limit` entries.
    pub results: Vec<MemoryResult>,
    /// Sources that were actually dispatched.
    pub sources_searched: Vec<MemorySource>,
    /// Number of results across all sources before truncation.
    pub total_results: usize,
    pub metadata: SearchMetadata,
}

impl UnifiedMemoryResult {
    /// Number of returned results produced by `source`.
    pub fn count_from(&self, source: MemorySource) -> usize {
        self.results.iter().filter(|r| r.source == source).count()
    }
}
