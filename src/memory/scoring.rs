//! Relevance heuristics for diary records.
//!
//! Diary rows carry no similarity score, so each record kind gets its own fixed weighting.
//! These scales are not calibrated against cosine similarity; they are compared with it as-is.

use serde::{Deserialize, Serialize};

/// Relevance of every matching thread summary.
pub const SUMMARY_RELEVANCE: f64 = 0.7;

/// Relevance of a decision whose priority is missing or unrecognised.
pub const DEFAULT_DECISION_RELEVANCE: f64 = 0.7;

/// Fact importance is stored on a 1..=10 scale.
pub const MIN_IMPORTANCE: i64 = 1;
pub const MAX_IMPORTANCE: i64 = 10;

/// `importance / 10`, with importance clamped into `1..=10`.
pub fn fact_relevance(importance: i64) -> f64 {
    importance.clamp(MIN_IMPORTANCE, MAX_IMPORTANCE) as f64 / 10.0
}

/// Priority attached to a recorded decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPriority {
    Urgent,
    High,
    Medium,
    Low,
}

impl DecisionPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn relevance(&self) -> f64 {
        match self {
            Self::Urgent => 0.95,
            Self::High => 0.85,
            Self::Medium => 0.70,
            Self::Low => 0.50,
        }
    }
}

impl std::fmt::Display for DecisionPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DecisionPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "urgent" => Ok(Self::Urgent),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("unknown decision priority: {s}")),
        }
    }
}

/// Relevance of a decision from its raw stored priority.
pub fn decision_relevance(priority: Option<&str>) -> f64 {
    priority
        .and_then(|p| p.parse::<DecisionPriority>().ok())
        .map(|p| p.relevance())
        .unwrap_or(DEFAULT_DECISION_RELEVANCE)
}
