//! Error taxonomy for the unified memory query engine.
//!
//! Only [`MemoryError::InvalidQuery`], [`MemoryError::NotInitialized`] and
//! [`MemoryError::Embedding`] ever escape [`search_memory`](crate::memory::engine::UnifiedMemoryQueryEngine::search_memory).
//! Backend failures inside a source adapter are logged and absorbed there.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    /// The query was rejected before any backend or embedding call.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A vector-scored source was requested but no embedding provider is configured.
    #[error("embedding provider not initialized; configure an API key first")]
    NotInitialized,

    /// Generating the query embedding failed.
    #[error("failed to generate embedding: {0}")]
    Embedding(String),

    /// Two vectors of different lengths were compared.
    #[error("vector dimension mismatch: {left} != {right}")]
    DimensionMismatch { left: usize, right: usize },
}
