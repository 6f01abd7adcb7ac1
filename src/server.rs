//! MCP server initialization for stdio and SSE transports.
//!
//! Provides [`serve_stdio`] and [`serve_sse`] entry points that wire up the database,
//! the unified query engine, and the MCP tool handler into a running server.

use crate::config::UnimemConfig;
use crate::db;
use crate::embedding;
use crate::memory::engine::UnifiedMemoryQueryEngine;
use crate::memory::sqlite::SqliteMemoryStore;
use crate::tools::UnimemTools;
use anyhow::Result;
use rmcp::ServiceExt;
use std::sync::{Arc, Mutex};

/// Build the query engine over a shared connection.
///
/// A missing or misconfigured embedding provider is not fatal: the engine still serves
/// diary-only queries and reports `NotInitialized` for library and desk.
pub fn build_engine(config: &UnimemConfig, db: Arc<Mutex<rusqlite::Connection>>) -> UnifiedMemoryQueryEngine {
    let mut engine = UnifiedMemoryQueryEngine::with_sqlite(SqliteMemoryStore::new(db), &config.retrieval);

    match embedding::create_provider(&config.embedding) {
        Ok(provider) => {
            engine.init_embedding(provider);
            tracing::info!(model = %config.embedding.model, "embedding provider ready");
        }
        Err(e) => {
            tracing::warn!(error = %e, "embedding provider unavailable; only diary searches will succeed");
        }
    }

    engine
}

/// Shared setup: open DB, build the engine, check the stored embedding model.
fn setup_shared_state(
    config: UnimemConfig,
) -> Result<(
    Arc<Mutex<rusqlite::Connection>>,
    Arc<UnifiedMemoryQueryEngine>,
    Arc<UnimemConfig>,
)> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    if let Ok(Some(stored_model)) = db::migrations::get_embedding_model(&conn) {
        if stored_model != config.embedding.model {
            tracing::warn!(
                stored = %stored_model,
                configured = %config.embedding.model,
                "embedding model differs from the one stored vectors were built with"
            );
        }
    }

    let db = Arc::new(Mutex::new(conn));
    let engine = Arc::new(build_engine(&config, Arc::clone(&db)));
    let config = Arc::new(config);

    Ok((db, engine, config))
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: UnimemConfig) -> Result<()> {
    tracing::info!("starting unimem MCP server on stdio");

    let (db, engine, config) = setup_shared_state(config)?;

    let tools = UnimemTools::new(db, engine, config);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over Streamable HTTP (SSE) transport.
pub async fn serve_sse(config: UnimemConfig) -> Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let bind_addr = format!("{host}:{port}");

    tracing::info!(addr = %bind_addr, "starting unimem MCP server on SSE/HTTP");

    let (db, engine, config) = setup_shared_state(config)?;

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(UnimemTools::new(db.clone(), engine.clone(), config.clone())),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down SSE server");
        })
        .await?;

    Ok(())
}
