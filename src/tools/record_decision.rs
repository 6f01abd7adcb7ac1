//! MCP `record_decision` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `record_decision` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RecordDecisionParams {
    #[schemars(description = "The decision, stated in full")]
    pub decision_text: String,

    #[schemars(description = "Optional category, e.g. 'technical', 'product'")]
    pub decision_type: Option<String>,

    /// Weight in search results: urgent 0.95, high 0.85, medium 0.70, low 0.50.
    #[schemars(description = "Priority: 'urgent', 'high', 'medium' or 'low'. Affects search ranking.")]
    pub priority: Option<String>,

    #[schemars(description = "Optional tags")]
    pub tags: Option<Vec<String>>,

    #[schemars(description = "Optional project ID the decision belongs to")]
    pub project_id: Option<String>,
}
