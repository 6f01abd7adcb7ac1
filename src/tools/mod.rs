pub mod forget_fact;
pub mod memory_stats;
pub mod record_decision;
pub mod remember_fact;
pub mod save_summary;
pub mod search_memory;

use forget_fact::ForgetFactParams;
use memory_stats::MemoryStatsParams;
use record_decision::RecordDecisionParams;
use remember_fact::RememberFactParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use rusqlite::Connection;
use save_summary::SaveSummaryParams;
use search_memory::SearchMemoryParams;
use std::sync::{Arc, Mutex};

use crate::config::UnimemConfig;
use crate::memory::context::enrich_prompt;
use crate::memory::engine::UnifiedMemoryQueryEngine;
use crate::memory::scoring::DecisionPriority;
use crate::memory::store::{self, DecisionRecord, FactRecord, SummaryRecord};
use crate::memory::types::{MemoryQuery, MemorySource};

/// The unimem MCP tool handler. Holds shared state (db connection, query engine, config)
/// and exposes all MCP tools via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct UnimemTools {
    tool_router: ToolRouter<Self>,
    db: Arc<Mutex<Connection>>,
    engine: Arc<UnifiedMemoryQueryEngine>,
    config: Arc<UnimemConfig>,
}

impl UnimemTools {
    /// Run a sync DB operation on the blocking pool.
    async fn with_db<T, F>(&self, f: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> anyhow::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| format!("db task failed: {e}"))?
        .map_err(|e| format!("{e:#}"))
    }
}

#[tool_router]
impl UnimemTools {
    pub fn new(
        db: Arc<Mutex<Connection>>,
        engine: Arc<UnifiedMemoryQueryEngine>,
        config: Arc<UnimemConfig>,
    ) -> Self {
        Self {
            tool_router: Self::tool_router(),
            db,
            engine,
            config,
        }
    }

    /// Search library, desk and diary in one call.
    #[tool(description = "Search all memory sources (library documents, personality desk files, diary facts/summaries/decisions) with one query. Returns results ranked by relevance.")]
    async fn search_memory(
        &self,
        Parameters(params): Parameters<SearchMemoryParams>,
    ) -> Result<String, String> {
        let sources = params
            .sources
            .map(|list| {
                list.iter()
                    .map(|s| s.parse::<MemorySource>())
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let query = MemoryQuery {
            query: params.query,
            user_id: params.user_id,
            personality_id: params.personality_id,
            project_id: params.project_id,
            sources,
            limit: params.limit,
            similarity_threshold: params.similarity_threshold,
        };

        tracing::info!(
            query_len = query.query.len(),
            has_personality = query.personality_id.is_some(),
            "search_memory called"
        );

        let result = self
            .engine
            .search_memory(&query)
            .await
            .map_err(|e| e.to_string())?;

        match params.format.as_deref() {
            None | Some("json") => {
                serde_json::to_string(&result).map_err(|e| format!("serialization failed: {e}"))
            }
            Some("prompt") => Ok(enrich_prompt(
                &query.query,
                &result,
                self.config.retrieval.prompt_snippet_chars,
            )),
            Some(other) => Err(format!("unknown format: {other}. Supported: json, prompt")),
        }
    }

    /// Store a diary fact.
    #[tool(description = "Remember a fact about the user or project in the diary. Importance (1-10) sets its search relevance.")]
    async fn remember_fact(
        &self,
        Parameters(params): Parameters<RememberFactParams>,
    ) -> Result<String, String> {
        let record = FactRecord {
            project_id: params.project_id,
            subject: params.subject,
            value: params.value,
            importance: params.importance.unwrap_or(5),
            tags: params.tags.unwrap_or_default(),
            metadata: None,
            created_at: None,
        };

        tracing::info!(subject = %record.subject, importance = record.importance, "remember_fact called");

        let id = self
            .with_db(move |conn| store::insert_fact(conn, &record))
            .await?;
        Ok(serde_json::json!({ "id": id }).to_string())
    }

    /// Deactivate a diary fact.
    #[tool(description = "Forget a previously remembered fact. The fact stops appearing in searches.")]
    async fn forget_fact(
        &self,
        Parameters(params): Parameters<ForgetFactParams>,
    ) -> Result<String, String> {
        tracing::info!(id = %params.fact_id, "forget_fact called");
        let fact_id = params.fact_id.clone();
        let forgotten = self
            .with_db(move |conn| store::deactivate_fact(conn, &fact_id))
            .await?;
        Ok(serde_json::json!({ "id": params.fact_id, "forgotten": forgotten }).to_string())
    }

    /// Store a diary decision.
    #[tool(description = "Record a decision in the diary. Priority (urgent/high/medium/low) sets its search relevance.")]
    async fn record_decision(
        &self,
        Parameters(params): Parameters<RecordDecisionParams>,
    ) -> Result<String, String> {
        let priority = params
            .priority
            .as_deref()
            .map(str::parse::<DecisionPriority>)
            .transpose()?;

        let record = DecisionRecord {
            project_id: params.project_id,
            decision_text: params.decision_text,
            decision_type: params.decision_type,
            priority,
            tags: params.tags.unwrap_or_default(),
            metadata: None,
            created_at: None,
        };

        tracing::info!(priority = ?record.priority, "record_decision called");

        let id = self
            .with_db(move |conn| store::insert_decision(conn, &record))
            .await?;
        Ok(serde_json::json!({ "id": id }).to_string())
    }

    /// Store a thread summary.
    #[tool(description = "Save a summary of the current conversation thread to the diary.")]
    async fn save_summary(
        &self,
        Parameters(params): Parameters<SaveSummaryParams>,
    ) -> Result<String, String> {
        let record = SummaryRecord {
            project_id: params.project_id,
            summary_text: params.summary_text,
            keywords: params.keywords.unwrap_or_default(),
            metadata: None,
            created_at: None,
        };

        tracing::info!(len = record.summary_text.len(), "save_summary called");

        let id = self
            .with_db(move |conn| store::insert_summary(conn, &record))
            .await?;
        Ok(serde_json::json!({ "id": id }).to_string())
    }

    /// Per-source row counts.
    #[tool(description = "Get memory statistics: library chunks, desk chunks per personality, diary facts, summaries and decisions.")]
    async fn memory_stats(
        &self,
        Parameters(params): Parameters<MemoryStatsParams>,
    ) -> Result<String, String> {
        let db_path = params
            .include_size
            .unwrap_or(true)
            .then(|| self.config.resolved_db_path());

        let stats = self
            .with_db(move |conn| crate::memory::stats::memory_stats(conn, db_path.as_deref()))
            .await?;
        serde_json::to_string(&stats).map_err(|e| format!("serialization failed: {e}"))
    }
}

#[tool_handler]
impl ServerHandler for UnimemTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "unimem searches a user's library documents, the active personality's files and \
                 the diary in one call. Use search_memory before answering, remember_fact, \
                 record_decision and save_summary to write the diary, forget_fact to retract."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
