//! Academic paper search via the arXiv export API.
//!
//! The export endpoint speaks Atom XML; entries are pulled out with a
//! quick-xml event reader rather than a full feed model, since only the
//! title, abstract, and link of each entry matter here.

use crate::tools::registry::{RetryPolicy, SearchProvider};
use crate::types::{AppError, Result, SearchResult};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;

const DEFAULT_API_BASE: &str = "https://export.arxiv.org/api/query";

/// Per-request timeout; a slow response counts as that attempt's failure.
const HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// arXiv paper search provider.
pub struct ArxivSearch {
    client: reqwest::Client,
    api_base: String,
    retry: RetryPolicy,
}

impl ArxivSearch {
    /// Create the provider with the standard metadata retry budget.
    pub fn new(user_agent: String) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
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
}

#[derive(Default)]
struct EntryDraft {
    title: String,
    summary: String,
    id: String,
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Title,
    Summary,
    Id,
}

/// Collapse runs of whitespace; Atom titles and abstracts wrap mid-sentence.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract `(title, summary, id)` triples from an Atom feed.
fn parse_feed(xml: &str) -> std::result::Result<Vec<EntryDraft>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);

    let mut entries = Vec::new();
    let mut current: Option<EntryDraft> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"entry" => current = Some(EntryDraft::default()),
                // The feed itself carries a <title> and <id>; only capture
                // fields while inside an <entry>.
                b"title" if current.is_some() => field = Some(Field::Title),
                b"summary" if current.is_some() => field = Some(Field::Summary),
                b"id" if current.is_some() => field = Some(Field::Id),
                _ => {}
            },
            Event::Text(text) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    let value = text.unescape()?;
                    match field {
                        Field::Title => entry.title.push_str(&value),
                        Field::Summary => entry.summary.push_str(&value),
                        Field::Id => entry.id.push_str(&value),
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"entry" => {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                }
                b"title" | b"summary" | b"id" => field = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

#[async_trait]
impl SearchProvider for ArxivSearch {
    fn name(&self) -> &str {
        "arxiv"
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .get(&self.api_base)
            .query(&[
                ("search_query", format!("all:{query}")),
                ("start", "0".to_string()),
                ("max_results", max_results.to_string()),
                ("sortBy", "relevance".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("arxiv request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Search(format!("arxiv returned status {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Search(format!("arxiv response unreadable: {e}")))?;

        let entries = parse_feed(&body)
            .map_err(|e| AppError::Search(format!("arxiv feed malformed: {e}")))?;

        Ok(entries
            .into_iter()
            .take(max_results)
            .map(|entry| {
                SearchResult::new(
                    normalize_whitespace(&entry.title),
                    entry.id,
                    normalize_whitespace(&entry.summary),
                    "arxiv",
                )
            })
            .collect())
    }
}
