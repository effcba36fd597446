//! Page content extraction for URLs quoted directly in a query.
//!
//! When the user pastes a link into their research question, its page
//! content becomes an additional source alongside the index-backed
//! providers. Queries without URLs produce an empty (non-error) result.

use crate::tools::registry::{RetryPolicy, SearchProvider};
use crate::types::{AppError, Result, SearchResult};
use async_trait::async_trait;

/// Upper bound on pages fetched per query.
const MAX_PAGES: usize = 2;

/// Content-fetch provider powered by daedra's page fetcher.
pub struct PageScraper {
    retry: RetryPolicy,
}

impl PageScraper {
    /// Create the provider with the content-fetch retry budget.
    pub fn new() -> Self {
        Self {
            retry: RetryPolicy::content_fetch(),
        }
    }

    /// Override the retry policy. Used by tests.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for PageScraper {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull http(s) URLs out of free text, in order of appearance.
fn extract_urls(query: &str) -> Vec<&str> {
    query
        .split_whitespace()
        .filter(|word| word.starts_with("http://") || word.starts_with("https://"))
        .map(|word| word.trim_end_matches([',', ';', ')', '.']))
        .collect()
}

#[async_trait]
impl SearchProvider for PageScraper {
    fn name(&self) -> &str {
        "web_scraper"
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    async fn search(&self, query: &str, _max_results: usize) -> Result<Vec<SearchResult>> {
        let urls = extract_urls(query);
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let mut results = Vec::new();
        for url in urls.into_iter().take(MAX_PAGES) {
            let args = daedra::VisitPageArgs {
                url: url.to_string(),
                include_images: false,
                selector: None,
            };

            let page = daedra::tools::fetch::fetch_page(&args)
                .await
                .map_err(|e| AppError::Search(format!("page fetch failed for {url}: {e}")))?;

            results.push(SearchResult::new(
                page.title,
                page.url,
                page.content,
                "web_scraper",
            ));
        }

        Ok(results)
    }
}
