//! LLM-powered deduplication and relevance ranking.
//!
//! Filtering is an optimization, not a correctness requirement: when the
//! model's answer cannot be parsed as an index array, the filter keeps all
//! results unchanged instead of failing the run. Only a transport failure
//! talking to the model propagates as an error.

use crate::llm::LLMClient;
use crate::types::{Result, SearchResult};
use std::sync::Arc;

const FILTER_SYSTEM: &str = "You are a precise research filter. Return only valid JSON.";

/// Relevance filter backed by a language model.
pub struct RelevanceFilter {
    llm: Arc<dyn LLMClient>,
}

impl RelevanceFilter {
    /// Create a filter over the given model client.
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    /// Select the most relevant, non-redundant subset of `results`, ordered
    /// by relevance. Empty input returns empty without a model call.
    pub async fn filter(
        &self,
        query: &str,
        results: &[SearchResult],
    ) -> Result<Vec<SearchResult>> {
        if results.is_empty() {
            tracing::warn!("no search results to filter");
            return Ok(Vec::new());
        }

        let prompt = build_filter_prompt(query, results);
        let response = self.llm.generate_with_system(FILTER_SYSTEM, &prompt).await?;

        let filtered = match parse_kept_indices(&response, results.len()) {
            Some(indices) => indices
                .into_iter()
                .map(|i| results[i - 1].clone())
                .collect(),
            None => {
                tracing::warn!("could not parse filter response, keeping all results");
                results.to_vec()
            }
        };

        tracing::info!(kept = filtered.len(), of = results.len(), "filtered results");
        Ok(filtered)
    }
}

fn build_filter_prompt(query: &str, results: &[SearchResult]) -> String {
    let listing = results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "[{}] Source: {} | Title: {}\n{}",
                i + 1,
                r.provider,
                r.title,
                r.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"Given the query and search results below, select the most relevant and
non-redundant results. Remove duplicates and low-quality results.
Return a JSON array of indices (1-based) of the results to keep, ordered by relevance.

Query: {query}

Search Results:
{listing}

Return ONLY a JSON array of indices, e.g. [1, 3, 5, 7]. No other text."#
    )
}

/// Parse the model's response as 1-based indices into a listing of `len`
/// results. Out-of-range indices are silently dropped; anything that is not
/// a JSON array of integers yields `None` (caller falls back to keep-all).
fn parse_kept_indices(response: &str, len: usize) -> Option<Vec<usize>> {
    let indices: Vec<i64> = serde_json::from_str(response.trim()).ok()?;
    Some(
        indices
            .into_iter()
            .filter(|&i| i >= 1 && i as usize <= len)
            .map(|i| i as usize)
            .collect(),
    )
}
