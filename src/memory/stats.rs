use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Row counts per source.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub library_chunks: u64,
    pub public_library_chunks: u64,
    pub desk_chunks: u64,
    pub personalities: u64,
    pub active_facts: u64,
    pub inactive_facts: u64,
    pub summaries: u64,
    pub decisions: u64,
    /// Decision counts keyed by stored priority (`"none"` when unset).
    pub decisions_by_priority: BTreeMap<String, u64>,
    pub db_size_bytes: u64,
}

/// Compute memory store statistics.
///
/// `db_path` is used for file size calculation; pass None for in-memory databases.
pub fn memory_stats(conn: &Connection, db_path: Option<&Path>) -> Result<StatsResponse> {
    let db_size_bytes = db_path
        .and_then(|p| std::fs::metadata(p).ok())
        .map(|m| m.len())
        .unwrap_or(0);

    Ok(StatsResponse {
        library_chunks: count(conn, "SELECT COUNT(*) FROM document_chunks")?,
        public_library_chunks: count(
            conn,
            "SELECT COUNT(*) FROM document_chunks WHERE is_public = 1",
        )?,
        desk_chunks: count(conn, "SELECT COUNT(*) FROM personality_embeddings")?,
        personalities: count(
            conn,
            "SELECT COUNT(DISTINCT personality_id) FROM personality_embeddings",
        )?,
        active_facts: count(conn, "SELECT COUNT(*) FROM facts WHERE is_active = 1")?,
        inactive_facts: count(conn, "SELECT COUNT(*) FROM facts WHERE is_active = 0")?,
        summaries: count(conn, "SELECT COUNT(*) FROM thread_summaries")?,
        decisions: count(conn, "SELECT COUNT(*) FROM decisions")?,
        decisions_by_priority: decisions_by_priority(conn)?,
        db_size_bytes,
    })
}

fn count(conn: &Connection, sql: &str) -> Result<u64> {
    let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(n as u64)
}

fn decisions_by_priority(conn: &Connection) -> Result<BTreeMap<String, u64>> {
    let mut stmt = conn.prepare(
        "SELECT COALESCE(priority, 'none'), COUNT(*) FROM decisions GROUP BY 1",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    Ok(rows)
}
