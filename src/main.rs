mod cli;
mod config;
mod db;
mod embedding;
mod error;
mod memory;
mod server;
mod tools;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::memory::types::MemorySource;

#[derive(Parser)]
#[command(name = "unimem", version, about = "Unified memory search for chat assistants")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (transport from config, or --transport)
    Serve {
        /// "stdio" or "sse"
        #[arg(long)]
        transport: Option<String>,
    },
    /// Search all memory sources from the terminal
    Search {
        /// Query text
        query: String,
        /// Requesting user (library visibility)
        #[arg(long, default_value = "local")]
        user: String,
        /// Personality whose desk files to search
        #[arg(long)]
        personality: Option<String>,
        /// Restrict library and diary to a project
        #[arg(long)]
        project: Option<String>,
        /// Source to search; repeat for several (default: all)
        #[arg(long = "source")]
        sources: Vec<MemorySource>,
        #[arg(long)]
        limit: Option<usize>,
        /// Minimum cosine similarity for library and desk
        #[arg(long)]
        threshold: Option<f64>,
        /// Print the raw result envelope as JSON
        #[arg(long)]
        json: bool,
        /// Print the query as an enriched chat prompt
        #[arg(long, conflicts_with = "json")]
        prompt: bool,
    },
    /// Show per-source memory statistics
    Stats,
    /// Run database diagnostics
    Doctor,
    /// Load pre-embedded records from a JSON file
    Import {
        /// Path to the import bundle
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::UnimemConfig::load()?;

    // Log to stderr so stdout stays clean for MCP JSON-RPC and CLI output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { transport } => {
            let transport = transport.unwrap_or_else(|| config.server.transport.clone());
            match transport.as_str() {
                "stdio" => server::serve_stdio(config).await?,
                "sse" => server::serve_sse(config).await?,
                other => anyhow::bail!("unknown transport: {other}. Supported: stdio, sse"),
            }
        }
        Command::Search {
            query,
            user,
            personality,
            project,
            sources,
            limit,
            threshold,
            json,
            prompt,
        } => {
            let mut q = memory::types::MemoryQuery::new(query, user);
            q.personality_id = personality;
            q.project_id = project;
            q.limit = limit;
            q.similarity_threshold = threshold;
            if !sources.is_empty() {
                q.sources = Some(sources);
            }
            let output = if json {
                cli::search::OutputFormat::Json
            } else if prompt {
                cli::search::OutputFormat::Prompt
            } else {
                cli::search::OutputFormat::Table
            };
            cli::search::search(&config, &q, output).await?;
        }
        Command::Stats => cli::stats::stats(&config)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
        Command::Import { file } => cli::import::import(&config, &file)?,
    }

    Ok(())
}
