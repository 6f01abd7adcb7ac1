//! MCP `remember_fact` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `remember_fact` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RememberFactParams {
    #[schemars(description = "What the fact is about, e.g. 'preferred language'")]
    pub subject: String,

    /// Any JSON value.
    #[schemars(description = "The fact's value. Any JSON value: string, number, object, ...")]
    pub value: serde_json::Value,

    #[schemars(description = "Importance from 1 (trivia) to 10 (critical). Defaults to 5.")]
    pub importance: Option<i64>,

    #[schemars(description = "Optional tags")]
    pub tags: Option<Vec<String>>,

    #[schemars(description = "Optional project ID the fact belongs to")]
    pub project_id: Option<String>,
}
