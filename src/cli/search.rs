use anyhow::Result;
use std::sync::{Arc, Mutex};

use crate::config::UnimemConfig;
use crate::memory::context::enrich_prompt;
use crate::memory::types::{MemoryQuery, MemorySource};

/// How `unimem search` prints its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Prompt,
}

/// Run a unified search from the terminal.
pub async fn search(config: &UnimemConfig, query: &MemoryQuery, output: OutputFormat) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = crate::db::open_database(&db_path)?;
    let engine = crate::server::build_engine(config, Arc::new(Mutex::new(conn)));

    let response = engine.search_memory(query).await?;

    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Prompt => {
            println!(
                "{}",
                enrich_prompt(&query.query, &response, config.retrieval.prompt_snippet_chars)
            );
        }
        OutputFormat::Table => {
            let searched: Vec<&str> = response.sources_searched.iter().map(MemorySource::as_str).collect();

            if response.results.is_empty() {
                println!("No results found (searched: {}).", searched.join(", "));
                return Ok(());
            }

            println!(
                "Found {} result(s), showing {} (searched: {}; {} ms)\n",
                response.total_results,
                response.results.len(),
                searched.join(", "),
                response.metadata.search_time_ms,
            );

            for (i, result) in response.results.iter().enumerate() {
                println!(
                    "  {}. [{}] relevance: {:.4}",
                    i + 1,
                    result.source,
                    result.relevance,
                );
                println!("     {}", super::preview(&result.content, 120));
                println!();
            }
        }
    }

    Ok(())
}
