//! MCP `save_summary` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `save_summary` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SaveSummaryParams {
    #[schemars(description = "Summary of a conversation thread")]
    pub summary_text: String,

    #[schemars(description = "Optional keywords describing the thread")]
    pub keywords: Option<Vec<String>>,

    #[schemars(description = "Optional project ID the thread belongs to")]
    pub project_id: Option<String>,
}
