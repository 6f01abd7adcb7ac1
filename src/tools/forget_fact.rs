//! MCP `forget_fact` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `forget_fact` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ForgetFactParams {
    /// ID returned by `remember_fact`.
    #[schemars(description = "ID of the fact to deactivate, as returned by remember_fact")]
    pub fact_id: String,
}
