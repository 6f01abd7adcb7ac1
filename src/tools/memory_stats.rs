//! MCP `memory_stats` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `memory_stats` MCP tool.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct MemoryStatsParams {
    /// Include the on-disk database size. Defaults to true.
    #[schemars(description = "Include the database file size. Defaults to true.")]
    pub include_size: Option<bool>,
}
