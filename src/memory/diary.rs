//! Diary source: lexical search over facts, thread summaries and decisions.
//!
//! The three sub-searches run concurrently and fail independently. Their union is re-ranked
//! and re-truncated, since each was capped at `limit` on its own.

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;

use crate::memory::backend::{DecisionRow, DiarySearch, DiaryStore, FactRow, SummaryRow};
use crate::memory::merge_metadata;
use crate::memory::scoring::{decision_relevance, fact_relevance, SUMMARY_RELEVANCE};
use crate::memory::types::{MemoryResult, MemorySource, Metadata};

pub struct DiaryAdapter {
    store: Arc<dyn DiaryStore>,
}

impl DiaryAdapter {
    pub fn new(store: Arc<dyn DiaryStore>) -> Self {
        Self { store }
    }

    /// Matching diary records, best first, at most `limit`. Never fails.
    pub async fn search(
        &self,
        text: &str,
        project_id: Option<&str>,
        limit: usize,
    ) -> Vec<MemoryResult> {
        let search = DiarySearch {
            text: text.to_string(),
            project_id: project_id.map(String::from),
            limit,
        };

        let (facts, summaries, decisions) = futures::join!(
            self.store.search_facts(&search),
            self.store.search_summaries(&search),
            self.store.search_decisions(&search),
        );

        let mut results: Vec<MemoryResult> = Vec::new();
        results.extend(or_empty("facts", facts).into_iter().map(fact_result));
        results.extend(or_empty("summaries", summaries).into_iter().map(summary_result));
        results.extend(or_empty("decisions", decisions).into_iter().map(decision_result));

        results.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        results.truncate(limit);

        tracing::debug!(count = results.len(), "diary search complete");
        results
    }
}

fn or_empty<T>(kind: &str, result: Result<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(kind, error = %format!("{e:#}"), "diary sub-search failed, skipping");
        Vec::new()
    })
}

fn fact_result(row: FactRow) -> MemoryResult {
    let mut metadata = Metadata::new();
    metadata.insert("kind".into(), json!("fact"));
    metadata.insert("tags".into(), row.tags.unwrap_or(serde_json::Value::Null));
    metadata.insert("importance".into(), json!(row.importance));
    metadata.insert("created_at".into(), json!(row.created_at));
    merge_metadata(&mut metadata, row.metadata);

    let content = format!("{}: {}", row.subject, row.value);
    MemoryResult::new(
        MemorySource::Diary,
        content,
        fact_relevance(row.importance),
        metadata,
    )
}

fn summary_result(row: SummaryRow) -> MemoryResult {
    let mut metadata = Metadata::new();
    metadata.insert("kind".into(), json!("summary"));
    metadata.insert("keywords".into(), row.keywords.unwrap_or(serde_json::Value::Null));
    metadata.insert("created_at".into(), json!(row.created_at));
    merge_metadata(&mut metadata, row.metadata);

    MemoryResult::new(MemorySource::Diary, row.summary_text, SUMMARY_RELEVANCE, metadata)
}

fn decision_result(row: DecisionRow) -> MemoryResult {
    let relevance = decision_relevance(row.priority.as_deref());

    let mut metadata = Metadata::new();
    metadata.insert("kind".into(), json!("decision"));
    metadata.insert("decision_type".into(), json!(row.decision_type));
    metadata.insert("priority".into(), json!(row.priority));
    metadata.insert("tags".into(), row.tags.unwrap_or(serde_json::Value::Null));
    metadata.insert("created_at".into(), json!(row.created_at));
    merge_metadata(&mut metadata, row.metadata);

    MemoryResult::new(MemorySource::Diary, row.decision_text, relevance, metadata)
}
