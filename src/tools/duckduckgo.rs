//! General web search via daedra (DuckDuckGo backend).

use crate::tools::registry::{RetryPolicy, SearchProvider};
use crate::types::{AppError, Result, SearchResult};
use async_trait::async_trait;

/// Web search provider powered by daedra.
pub struct DuckDuckGoSearch {
    retry: RetryPolicy,
}

impl DuckDuckGoSearch {
    /// Create the provider with the standard metadata retry budget.
    pub fn new() -> Self {
        Self {
            retry: RetryPolicy::metadata(),
        }
    }

    /// Override the retry policy. Used by tests.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: max_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&args)
            .await
            .map_err(|e| AppError::Search(format!("duckduckgo search failed: {e}")))?;

        Ok(response
            .data
            .iter()
            .take(max_results)
            .map(|r| SearchResult::new(&r.title, &r.url, &r.description, "duckduckgo"))
            .collect())
    }
}
