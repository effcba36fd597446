//! Encyclopedia lookups via the MediaWiki search API.

use crate::tools::registry::{RetryPolicy, SearchProvider};
use crate::types::{AppError, Result, SearchResult};
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_API_BASE: &str = "https://en.wikipedia.org/w/api.php";

/// Per-request timeout; a slow response counts as that attempt's failure.
const HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Wikipedia article search provider.
pub struct WikipediaSearch {
    client: reqwest::Client,
    api_base: String,
    limit: usize,
    retry: RetryPolicy,
}

#[derive(Deserialize)]
struct ApiResponse {
    query: QueryBody,
}

#[derive(Deserialize)]
struct QueryBody {
    search: Vec<Page>,
}

#[derive(Deserialize)]
struct Page {
    title: String,
    snippet: String,
}

impl WikipediaSearch {
    /// Create the provider.
    ///
    /// `limit` caps the number of articles regardless of the aggregate
    /// request size; Wikipedia snippets are short and a handful suffices.
    pub fn new(limit: usize, user_agent: String) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            limit,
            retry: RetryPolicy::metadata(),
        }
    }

    /// Override the API base URL. Used by tests against a mock server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Override the retry policy. Used by tests.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn article_url(title: &str) -> String {
        format!(
            "https://en.wikipedia.org/wiki/{}",
            title.replace(' ', "_")
        )
    }
}

/// Remove search-highlight markup and common entities from an API snippet.
fn strip_markup(snippet: &str) -> String {
    let mut text = String::with_capacity(snippet.len());
    let mut in_tag = false;
    for c in snippet.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&quot;", "\"")
        .replace("&amp;", "&")
        .replace("&#039;", "'")
}

#[async_trait]
impl SearchProvider for WikipediaSearch {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let limit = self.limit.min(max_results).max(1).to_string();
        let response = self
            .client
            .get(&self.api_base)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("format", "json"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("wikipedia request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Search(format!(
                "wikipedia returned status {status}"
            )));
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("wikipedia response malformed: {e}")))?;

        Ok(parsed
            .query
            .search
            .into_iter()
            .map(|page| {
                let url = Self::article_url(&page.title);
                SearchResult::new(page.title, url, strip_markup(&page.snippet), "wikipedia")
            })
            .collect())
    }
}
