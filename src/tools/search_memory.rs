//! MCP `search_memory` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `search_memory` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchMemoryParams {
    /// Natural language query.
    #[schemars(description = "Natural language query to search memory with")]
    pub query: String,

    /// Requesting user. Library chunks are visible if public or owned by this user.
    #[schemars(description = "Requesting user ID. Library results are limited to public chunks and chunks this user owns.")]
    pub user_id: String,

    /// Personality whose attached files (desk) should be searched.
    #[schemars(description = "Personality ID. Required for desk results; desk is skipped without it.")]
    pub personality_id: Option<String>,

    /// Optional project to narrow library and diary results.
    #[schemars(description = "Optional project ID to narrow library and diary results")]
    pub project_id: Option<String>,

    /// Subset of `"library"`, `"desk"`, `"diary"`. Defaults to all.
    #[schemars(description = "Sources to search: any of 'library', 'desk', 'diary'. Defaults to all.")]
    pub sources: Option<Vec<String>>,

    /// Maximum results. Defaults to 10.
    #[schemars(description = "Maximum number of results to return. Defaults to 10.")]
    pub limit: Option<usize>,

    /// Minimum cosine similarity for library and desk (0.0–1.0). Defaults to 0.5.
    #[schemars(description = "Minimum cosine similarity for library and desk results (0.0-1.0). Defaults to 0.5.")]
    pub similarity_threshold: Option<f64>,

    /// `"json"` (default) or `"prompt"`.
    #[schemars(description = "Response format: 'json' (full result envelope, default) or 'prompt' (query enriched with memory context)")]
    pub format: Option<String>,
}
