//! Search provider trait, retry policy, and the aggregating registry.
//!
//! Providers are registered in invocation order and queried concurrently;
//! the aggregate result is their concatenated output in that same order. A
//! provider that exhausts its retry budget is logged and excluded; it never
//! aborts the aggregation of the others.

use crate::types::{Result, SearchResult};
use crate::utils::config::SearchConfig;
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Bounded retry with exponential backoff for one provider's calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per subsequent retry.
    pub base_delay: Duration,
    /// Ceiling on any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Policy for metadata-style lookups (search indexes): 3 attempts.
    pub fn metadata() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
        }
    }

    /// Policy for content-fetch-style calls (page retrieval): 2 attempts.
    pub fn content_fetch() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
        }
    }

    /// Delay before attempt number `attempt` (1-based; attempt 1 has none).
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exp = self.base_delay.saturating_mul(2u32.saturating_pow(attempt - 2));
        exp.min(self.max_delay)
    }
}

/// An external search or content-retrieval source.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name, used to tag results and in `tools_used` reporting.
    fn name(&self) -> &str;

    /// Retry budget for this provider's calls.
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::metadata()
    }

    /// Run one search. An empty vec is a valid, non-error result.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

/// Ordered collection of providers with fan-out aggregation.
pub struct SearchRegistry {
    providers: Vec<Arc<dyn SearchProvider>>,
    max_results: usize,
}

impl SearchRegistry {
    /// Create an empty registry.
    pub fn new(max_results: usize) -> Self {
        Self {
            providers: Vec::new(),
            max_results,
        }
    }

    /// Create a registry with the full default provider set
    /// (duckduckgo, wikipedia, arxiv, web_scraper).
    pub fn with_default_providers(config: &SearchConfig) -> Self {
        let mut registry = Self::new(config.max_results);
        registry.register(Arc::new(crate::tools::duckduckgo::DuckDuckGoSearch::new()));
        registry.register(Arc::new(crate::tools::wikipedia::WikipediaSearch::new(
            config.wikipedia_results,
            config.user_agent.clone(),
        )));
        registry.register(Arc::new(crate::tools::arxiv::ArxivSearch::new(
            config.user_agent.clone(),
        )));
        registry.register(Arc::new(crate::tools::scrape::PageScraper::new()));
        registry
    }

    /// Register a provider. Registration order is invocation order.
    pub fn register(&mut self, provider: Arc<dyn SearchProvider>) {
        self.providers.push(provider);
    }

    /// Names of all registered providers, in invocation order.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry has no providers.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Query every provider and concatenate their results in invocation
    /// order. Provider failures are isolated: each provider gets its own
    /// retry budget, and terminal failures are logged and skipped. An empty
    /// vec is a valid outcome.
    pub async fn aggregate(&self, query: &str) -> Vec<SearchResult> {
        let calls = self
            .providers
            .iter()
            .map(|provider| search_with_retry(Arc::clone(provider), query, self.max_results));

        // join_all preserves input order, so concatenation below stays in
        // provider-invocation order even though the calls run concurrently.
        let outcomes = join_all(calls).await;

        let mut results = Vec::new();
        for (provider, outcome) in self.providers.iter().zip(outcomes) {
            match outcome {
                Ok(batch) => {
                    tracing::info!(
                        provider = provider.name(),
                        count = batch.len(),
                        "provider returned results"
                    );
                    results.extend(batch);
                }
                Err(e) => {
                    tracing::error!(
                        provider = provider.name(),
                        error = %e,
                        "provider failed after retries"
                    );
                }
            }
        }

        tracing::info!(total = results.len(), "aggregated search results");
        results
    }
}

/// Run one provider under its retry policy. Returns the first success or
/// the last error once the budget is exhausted.
async fn search_with_retry(
    provider: Arc<dyn SearchProvider>,
    query: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>> {
    let policy = provider.retry_policy();
    let mut last_err = None;

    for attempt in 1..=policy.max_attempts {
        let delay = policy.delay(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
            tracing::debug!(provider = provider.name(), attempt, "retrying provider");
        }

        match provider.search(query, max_results).await {
            Ok(results) => return Ok(results),
            Err(e) => {
                tracing::warn!(
                    provider = provider.name(),
                    attempt,
                    error = %e,
                    "provider attempt failed"
                );
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        crate::types::AppError::Search(format!("{}: no attempts configured", provider.name()))
    }))
}
