use anyhow::Result;

use crate::config::UnimemConfig;

/// Display per-source memory statistics in the terminal.
pub fn stats(config: &UnimemConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path)?;

    let response = crate::memory::stats::memory_stats(&conn, Some(&db_path))?;

    println!("Memory Statistics");
    println!("{}", "=".repeat(40));
    println!("Library:");
    println!("  Chunks:              {}", response.library_chunks);
    println!("  Public:              {}", response.public_library_chunks);
    println!();

    println!("Desk:");
    println!("  Chunks:              {}", response.desk_chunks);
    println!("  Personalities:       {}", response.personalities);
    println!();

    println!("Diary:");
    println!("  Active facts:        {}", response.active_facts);
    println!("  Inactive facts:      {}", response.inactive_facts);
    println!("  Summaries:           {}", response.summaries);
    println!("  Decisions:           {}", response.decisions);
    for (priority, count) in &response.decisions_by_priority {
        println!("    {:<18} {}", priority, count);
    }
    println!();

    println!("Database size:         {}", super::format_bytes(response.db_size_bytes));

    Ok(())
}
