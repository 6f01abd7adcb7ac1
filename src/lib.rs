//! Unified memory for chat assistants.
//!
//! unimem answers one question for a chat turn: what do we already know that is relevant to
//! this message? It searches three differently shaped stores and ranks their answers together:
//!
//! | Source | Contents | Matching | Relevance |
//! |--------|----------|----------|-----------|
//! | **Library** | Shared document chunks, public or owned by a user | Vector, in SQL | Cosine similarity |
//! | **Desk** | Files attached to one assistant personality | Vector, in-process | Cosine similarity |
//! | **Diary** | Facts, thread summaries, decisions | Substring | Importance / fixed / priority weight |
//!
//! # Architecture
//!
//! - **Storage**: SQLite, with [sqlite-vec](https://github.com/asg017/sqlite-vec) providing
//!   `vec_distance_cosine` for the library
//! - **Embeddings**: any OpenAI-compatible `/embeddings` endpoint (1536 dimensions by default)
//! - **Search**: concurrent fan-out to the three sources, each isolated from the others'
//!   failures, merged by descending relevance
//! - **Transport**: CLI, or MCP over stdio / Streamable HTTP
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite initialization, schema, migrations, and health checks
//! - [`embedding`]: Text-to-vector embedding via HTTP
//! - [`error`]: The query engine's error taxonomy
//! - [`memory`]: Source adapters, the unified query engine, prompt context, and writes

pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod memory;

pub use error::MemoryError;
pub use memory::engine::{EngineOptions, UnifiedMemoryQueryEngine};
pub use memory::types::{MemoryQuery, MemoryResult, MemorySource, UnifiedMemoryResult};
