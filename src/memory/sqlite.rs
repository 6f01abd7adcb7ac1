//! SQLite implementation of the library, desk and diary stores.
//!
//! Queries run synchronously on a shared connection inside `spawn_blocking`. Library
//! similarity is computed by sqlite-vec's `vec_distance_cosine` so the visibility filter,
//! threshold and limit are all applied in SQL.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection};

use super::{bytes_to_embedding, embedding_to_bytes, parse_json_column};
use crate::memory::backend::{
    DecisionRow, DeskCandidate, DeskStore, DiarySearch, DiaryStore, FactRow, LibraryChunk,
    LibrarySearch, LibraryStore, SummaryRow,
};

/// All three stores over one SQLite connection.
#[derive(Clone)]
pub struct SqliteMemoryStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteMemoryStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self::new(Arc::new(Mutex::new(conn)))
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
            f(&conn)
        })
        .await
        .context("db task failed")?
    }
}

#[async_trait]
impl LibraryStore for SqliteMemoryStore {
    async fn search_chunks(&self, search: LibrarySearch) -> Result<Vec<LibraryChunk>> {
        self.with_conn(move |conn| search_library_chunks(conn, &search))
            .await
    }
}

#[async_trait]
impl DeskStore for SqliteMemoryStore {
    async fn fetch_candidates(
        &self,
        personality_id: &str,
        max_candidates: usize,
    ) -> Result<Vec<DeskCandidate>> {
        let personality_id = personality_id.to_string();
        self.with_conn(move |conn| fetch_desk_candidates(conn, &personality_id, max_candidates))
            .await
    }
}

#[async_trait]
impl DiaryStore for SqliteMemoryStore {
    async fn search_facts(&self, search: &DiarySearch) -> Result<Vec<FactRow>> {
        let search = search.clone();
        self.with_conn(move |conn| search_facts(conn, &search)).await
    }

    async fn search_summaries(&self, search: &DiarySearch) -> Result<Vec<SummaryRow>> {
        let search = search.clone();
        self.with_conn(move |conn| search_summaries(conn, &search))
            .await
    }

    async fn search_decisions(&self, search: &DiarySearch) -> Result<Vec<DecisionRow>> {
        let search = search.clone();
        self.with_conn(move |conn| search_decisions(conn, &search))
            .await
    }
}

// ── Queries ───────────────────────────────────────────────────────────────────

/// Library similarity search with visibility (`is_public OR user_id = ?`), optional
/// project narrowing, threshold and limit evaluated in SQL.
///
/// With a `project_id`, chunks tagged with that project and chunks with no project match.
/// Chunks whose vector length differs from the query's are skipped.
pub fn search_library_chunks(conn: &Connection, search: &LibrarySearch) -> Result<Vec<LibraryChunk>> {
    let mut stmt = conn.prepare(
        "SELECT id, content, file_name, metadata, created_at, similarity FROM ( \
             SELECT id, content, file_name, metadata, created_at, \
                    CASE WHEN vec_length(embedding) = ?6 \
                         THEN 1.0 - vec_distance_cosine(embedding, ?1) END AS similarity \
             FROM document_chunks \
             WHERE (is_public = 1 OR user_id = ?2) \
               AND (?3 IS NULL OR project_id IS NULL OR project_id = ?3) \
               AND vec_length(embedding) = ?6 \
         ) \
         WHERE similarity >= ?4 \
         ORDER BY similarity DESC \
         LIMIT ?5",
    )?;

    let rows = stmt
        .query_map(
            params![
                embedding_to_bytes(&search.embedding),
                search.user_id,
                search.project_id,
                search.threshold,
                search.limit as i64,
                search.embedding.len() as i64,
            ],
            |row| {
                Ok(LibraryChunk {
                    id: row.get(0)?,
                    content: row.get(1)?,
                    file_name: row.get(2)?,
                    metadata: parse_json_column(row.get(3)?),
                    created_at: row.get(4)?,
                    similarity: row.get(5)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Newest-first desk chunks for one personality, capped at `max_candidates`.
pub fn fetch_desk_candidates(
    conn: &Connection,
    personality_id: &str,
    max_candidates: usize,
) -> Result<Vec<DeskCandidate>> {
    let mut stmt = conn.prepare(
        "SELECT chunk_text, embedding, chunk_index, file_name, created_at \
         FROM personality_embeddings \
         WHERE personality_id = ?1 \
         ORDER BY created_at DESC, chunk_index ASC \
         LIMIT ?2",
    )?;

    let raw = stmt
        .query_map(params![personality_id, max_candidates as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Vec<u8>>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    raw.into_iter()
        .map(|(chunk_text, blob, chunk_index, file_name, created_at)| {
            Ok(DeskCandidate {
                chunk_text,
                embedding: bytes_to_embedding(&blob)?,
                chunk_index,
                file_name,
                created_at,
            })
        })
        .collect()
}

/// Active facts with `subject` containing the text (case-insensitive for ASCII).
pub fn search_facts(conn: &Connection, search: &DiarySearch) -> Result<Vec<FactRow>> {
    let mut stmt = conn.prepare(
        "SELECT subject, value, importance, tags, metadata, created_at \
         FROM facts \
         WHERE is_active = 1 \
           AND (?1 IS NULL OR project_id = ?1) \
           AND subject LIKE ?2 ESCAPE '\\' \
         ORDER BY importance DESC, created_at DESC \
         LIMIT ?3",
    )?;

    let rows = stmt
        .query_map(
            params![search.project_id, like_pattern(&search.text), search.limit as i64],
            |row| {
                let value: String = row.get(1)?;
                Ok(FactRow {
                    subject: row.get(0)?,
                    value: serde_json::from_str(&value)
                        .unwrap_or(serde_json::Value::String(value)),
                    importance: row.get(2)?,
                    tags: parse_json_column(row.get(3)?),
                    metadata: parse_json_column(row.get(4)?),
                    created_at: row.get(5)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn search_summaries(conn: &Connection, search: &DiarySearch) -> Result<Vec<SummaryRow>> {
    let mut stmt = conn.prepare(
        "SELECT summary_text, keywords, metadata, created_at \
         FROM thread_summaries \
         WHERE (?1 IS NULL OR project_id = ?1) \
           AND summary_text LIKE ?2 ESCAPE '\\' \
         ORDER BY created_at DESC \
         LIMIT ?3",
    )?;

    let rows = stmt
        .query_map(
            params![search.project_id, like_pattern(&search.text), search.limit as i64],
            |row| {
                Ok(SummaryRow {
                    summary_text: row.get(0)?,
                    keywords: parse_json_column(row.get(1)?),
                    metadata: parse_json_column(row.get(2)?),
                    created_at: row.get(3)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn search_decisions(conn: &Connection, search: &DiarySearch) -> Result<Vec<DecisionRow>> {
    let mut stmt = conn.prepare(
        "SELECT decision_text, decision_type, priority, tags, metadata, created_at \
         FROM decisions \
         WHERE (?1 IS NULL OR project_id = ?1) \
           AND decision_text LIKE ?2 ESCAPE '\\' \
         ORDER BY created_at DESC \
         LIMIT ?3",
    )?;

    let rows = stmt
        .query_map(
            params![search.project_id, like_pattern(&search.text), search.limit as i64],
            |row| {
                Ok(DecisionRow {
                    decision_text: row.get(0)?,
                    decision_type: row.get(1)?,
                    priority: row.get(2)?,
                    tags: parse_json_column(row.get(3)?),
                    metadata: parse_json_column(row.get(4)?),
                    created_at: row.get(5)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// `%text%` with LIKE wildcards in `text` escaped.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
