//! CLI `doctor` command: database diagnostics and embedding configuration check.

use anyhow::{Context, Result};

use crate::config::UnimemConfig;
use crate::db;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &UnimemConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `unimem serve` or `unimem import <file>` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;

    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("unimem Health Report");
    println!("====================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", super::format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!("sqlite-vec:        {}", report.sqlite_vec_version);
    println!();
    println!("Embedding:");
    println!("  Stored model:    {}", report.embedding_model.as_deref().unwrap_or("(not set)"));
    println!("  Configured:      {}", config.embedding.model);
    println!("  Endpoint:        {}", config.embedding.base_url);
    println!("  Dimensions:      {}", config.embedding.dimensions);
    if let Some(ref stored) = report.embedding_model {
        if stored != &config.embedding.model {
            println!("  WARNING: model mismatch! Stored vectors will not compare with new queries.");
        } else {
            println!("  Status:          OK (match)");
        }
    }
    match crate::embedding::create_provider(&config.embedding) {
        Ok(_) => println!("  Provider:        ready"),
        Err(e) => println!("  Provider:        unavailable ({e}); library and desk searches will fail"),
    }
    println!();
    println!("Row counts:");
    println!("  Library chunks:  {}", report.library_chunks);
    println!("  Desk chunks:     {}", report.desk_chunks);
    println!("  Facts:           {}", report.facts);
    println!("  Summaries:       {}", report.summaries);
    println!("  Decisions:       {}", report.decisions);
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Restore from a backup: cp backup.db {}", db_path.display());
        println!("  2. Or delete the database and re-run `unimem import` from your source bundles");
    }

    Ok(())
}
