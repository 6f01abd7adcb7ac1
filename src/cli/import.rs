use anyhow::{Context, Result};
use std::path::Path;

use crate::config::UnimemConfig;
use crate::memory::store::{import_bundle, ImportBundle};

/// Import pre-embedded records from a JSON bundle.
///
/// Vectors are stored as given; every one must match the configured embedding dimensions.
/// The whole bundle is written in one transaction, so a bad record imports nothing.
pub fn import(config: &UnimemConfig, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;

    let bundle: ImportBundle = serde_json::from_str(&json).context("failed to parse import JSON")?;

    let db_path = config.resolved_db_path();
    let mut conn = crate::db::open_database(&db_path)?;

    println!(
        "Importing {} library chunks, {} desk chunks, {} facts, {} summaries, {} decisions...",
        bundle.library.len(),
        bundle.desk.len(),
        bundle.facts.len(),
        bundle.summaries.len(),
        bundle.decisions.len(),
    );

    let summary = import_bundle(&mut conn, &bundle, config.embedding.dimensions)?;
    if !bundle.library.is_empty() || !bundle.desk.is_empty() {
        crate::db::migrations::set_embedding_model(&conn, &config.embedding.model)?;
    }

    println!("Import complete:");
    println!("  Library chunks: {}", summary.library);
    println!("  Desk chunks:    {}", summary.desk);
    println!("  Facts:          {}", summary.facts);
    println!("  Summaries:      {}", summary.summaries);
    println!("  Decisions:      {}", summary.decisions);

    Ok(())
}
