//! Write path for the three sources.
//!
//! Ingestion itself (file upload, chunking, embedding documents) lives outside this crate;
//! these helpers only persist records that arrive already chunked and embedded. They back
//! the `import` command, the diary MCP tools, and test fixtures.

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::embedding_to_bytes;
use crate::memory::scoring::{DecisionPriority, MAX_IMPORTANCE, MIN_IMPORTANCE};

/// A pre-embedded library chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunkRecord {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub chunk_index: i64,
    pub content: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A pre-embedded chunk of a file attached to a personality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskChunkRecord {
    pub personality_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub chunk_index: i64,
    pub chunk_text: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactRecord {
    #[serde(default)]
    pub project_id: Option<String>,
    pub subject: String,
    pub value: serde_json::Value,
    /// 1..=10
    #[serde(default = "default_importance")]
    pub importance: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRecord {
    #[serde(default)]
    pub project_id: Option<String>,
    pub summary_text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    #[serde(default)]
    pub project_id: Option<String>,
    pub decision_text: String,
    #[serde(default)]
    pub decision_type: Option<String>,
    #[serde(default)]
    pub priority: Option<DecisionPriority>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_importance() -> i64 {
    5
}

/// Everything `unimem import` accepts, in one JSON document.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImportBundle {
    pub library: Vec<DocumentChunkRecord>,
    pub desk: Vec<DeskChunkRecord>,
    pub facts: Vec<FactRecord>,
    pub summaries: Vec<SummaryRecord>,
    pub decisions: Vec<DecisionRecord>,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub library: usize,
    pub desk: usize,
    pub facts: usize,
    pub summaries: usize,
    pub decisions: usize,
}

fn now_or(created_at: &Option<String>) -> String {
    created_at
        .clone()
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339())
}

fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

fn to_json_text<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("failed to serialize JSON column")
}

fn optional_json(value: &Option<serde_json::Value>) -> Result<Option<String>> {
    value.as_ref().map(to_json_text).transpose()
}

/// Insert a library chunk. Returns the new chunk ID.
pub fn insert_document_chunk(conn: &Connection, chunk: &DocumentChunkRecord) -> Result<String> {
    if chunk.content.trim().is_empty() {
        bail!("chunk content must not be empty");
    }
    if chunk.embedding.is_empty() {
        bail!("chunk embedding must not be empty");
    }
    if !chunk.is_public && chunk.user_id.is_none() {
        bail!("private chunk needs an owning user_id");
    }

    let id = new_id();
    conn.execute(
        "INSERT INTO document_chunks \
         (id, user_id, project_id, is_public, file_name, chunk_index, content, embedding, metadata, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            id,
            chunk.user_id,
            chunk.project_id,
            chunk.is_public,
            chunk.file_name,
            chunk.chunk_index,
            chunk.content,
            embedding_to_bytes(&chunk.embedding),
            optional_json(&chunk.metadata)?,
            now_or(&chunk.created_at),
        ],
    )?;
    Ok(id)
}

/// Insert a desk chunk. Returns the new chunk ID.
pub fn insert_desk_chunk(conn: &Connection, chunk: &DeskChunkRecord) -> Result<String> {
    if chunk.personality_id.trim().is_empty() {
        bail!("personality_id must not be empty");
    }
    if chunk.chunk_text.trim().is_empty() {
        bail!("chunk text must not be empty");
    }

    let id = new_id();
    conn.execute(
        "INSERT INTO personality_embeddings \
         (id, personality_id, file_name, chunk_index, chunk_text, embedding, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id,
            chunk.personality_id,
            chunk.file_name,
            chunk.chunk_index,
            chunk.chunk_text,
            embedding_to_bytes(&chunk.embedding),
            now_or(&chunk.created_at),
        ],
    )?;
    Ok(id)
}

/// Insert an active fact. Returns the new fact ID.
pub fn insert_fact(conn: &Connection, fact: &FactRecord) -> Result<String> {
    if fact.subject.trim().is_empty() {
        bail!("fact subject must not be empty");
    }
    if !(MIN_IMPORTANCE..=MAX_IMPORTANCE).contains(&fact.importance) {
        bail!(
            "importance must be between {MIN_IMPORTANCE} and {MAX_IMPORTANCE}, got {}",
            fact.importance
        );
    }

    let id = new_id();
    conn.execute(
        "INSERT INTO facts (id, project_id, subject, value, importance, tags, metadata, is_active, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)",
        params![
            id,
            fact.project_id,
            fact.subject,
            to_json_text(&fact.value)?,
            fact.importance,
            to_json_text(&fact.tags)?,
            optional_json(&fact.metadata)?,
            now_or(&fact.created_at),
        ],
    )?;
    Ok(id)
}

/// Mark a fact inactive so it no longer matches searches. Returns `false` if no such fact.
pub fn deactivate_fact(conn: &Connection, fact_id: &str) -> Result<bool> {
    let rows = conn.execute(
        "UPDATE facts SET is_active = 0 WHERE id = ?1 AND is_active = 1",
        params![fact_id],
    )?;
    Ok(rows > 0)
}

/// Insert a thread summary. Returns the new summary ID.
pub fn insert_summary(conn: &Connection, summary: &SummaryRecord) -> Result<String> {
    if summary.summary_text.trim().is_empty() {
        bail!("summary text must not be empty");
    }

    let id = new_id();
    conn.execute(
        "INSERT INTO thread_summaries (id, project_id, summary_text, keywords, metadata, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            summary.project_id,
            summary.summary_text,
            to_json_text(&summary.keywords)?,
            optional_json(&summary.metadata)?,
            now_or(&summary.created_at),
        ],
    )?;
    Ok(id)
}

/// Insert a decision. Returns the new decision ID.
pub fn insert_decision(conn: &Connection, decision: &DecisionRecord) -> Result<String> {
    if decision.decision_text.trim().is_empty() {
        bail!("decision text must not be empty");
    }

    let id = new_id();
    conn.execute(
        "INSERT INTO decisions (id, project_id, decision_text, decision_type, priority, tags, metadata, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            decision.project_id,
            decision.decision_text,
            decision.decision_type,
            decision.priority.map(|p| p.as_str()),
            to_json_text(&decision.tags)?,
            optional_json(&decision.metadata)?,
            now_or(&decision.created_at),
        ],
    )?;
    Ok(id)
}

/// Load a whole bundle in one transaction. Every embedding must have `expected_dim` entries.
pub fn import_bundle(
    conn: &mut Connection,
    bundle: &ImportBundle,
    expected_dim: usize,
) -> Result<ImportSummary> {
    let dims = bundle
        .library
        .iter()
        .map(|c| c.embedding.len())
        .chain(bundle.desk.iter().map(|c| c.embedding.len()));
    for (i, len) in dims.enumerate() {
        if len != expected_dim {
            bail!("embedding #{i} has {len} dimensions, expected {expected_dim}");
        }
    }

    let tx = conn.transaction()?;
    for chunk in &bundle.library {
        insert_document_chunk(&tx, chunk)?;
    }
    for chunk in &bundle.desk {
        insert_desk_chunk(&tx, chunk)?;
    }
    for fact in &bundle.facts {
        insert_fact(&tx, fact)?;
    }
    for summary in &bundle.summaries {
        insert_summary(&tx, summary)?;
    }
    for decision in &bundle.decisions {
        insert_decision(&tx, decision)?;
    }
    tx.commit()?;

    let summary = ImportSummary {
        library: bundle.library.len(),
        desk: bundle.desk.len(),
        facts: bundle.facts.len(),
        summaries: bundle.summaries.len(),
        decisions: bundle.decisions.len(),
    };
    tracing::info!(?summary, "import complete");
    Ok(summary)
}
