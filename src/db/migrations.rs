//! Forward-only schema migrations.
//!
//! `schema_meta` holds the schema version and the embedding model the stored vectors
//! were produced with. Each step in [`MIGRATIONS`] lifts the database by one version.

use rusqlite::{Connection, OptionalExtension};

/// The schema version that the current binary expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// The model assumed for vectors written before the model was recorded.
const LEGACY_EMBEDDING_MODEL: &str = "text-embedding-3-small";

type Step = fn(&Connection) -> rusqlite::Result<()>;

/// `(target version, step)` in ascending order.
const MIGRATIONS: &[(u32, Step)] = &[(2, record_model_and_recency_indexes)];

fn read_meta(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = ?1",
        [key],
        |row| row.get(0),
    )
    .optional()
}

fn write_meta(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_meta (key, value) VALUES (?1, ?2)",
        [key, value],
    )?;
    Ok(())
}

/// Stored schema version. A missing or unparsable value reads as 0.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    Ok(read_meta(conn, "schema_version")?
        .and_then(|v| v.parse().ok())
        .unwrap_or(0))
}

/// The embedding model recorded for this database, if any.
pub fn get_embedding_model(conn: &Connection) -> rusqlite::Result<Option<String>> {
    read_meta(conn, "embedding_model")
}

/// Record the embedding model used for stored library and desk vectors.
pub fn set_embedding_model(conn: &Connection, model: &str) -> rusqlite::Result<()> {
    write_meta(conn, "embedding_model", model)
}

/// Apply every pending step. A failing step rolls back alone and leaves the
/// version at the last step that succeeded.
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    let start = get_schema_version(conn)?;
    tracing::debug!(schema_version = start, target = CURRENT_SCHEMA_VERSION, "checking migrations");

    for &(target, step) in MIGRATIONS.iter().filter(|(target, _)| *target > start) {
        tracing::info!(to = target, "running migration");
        let tx = conn.unchecked_transaction()?;
        step(&tx)?;
        write_meta(&tx, "schema_version", &target.to_string())?;
        tx.commit()?;
    }

    Ok(())
}

/// v2: record the embedding model and index diary recency ordering.
fn record_model_and_recency_indexes(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('embedding_model', ?1)",
        [LEGACY_EMBEDDING_MODEL],
    )?;
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_summaries_created ON thread_summaries(created_at);
         CREATE INDEX IF NOT EXISTS idx_decisions_created ON decisions(created_at);",
    )
}
