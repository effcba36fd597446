//! Provider tests against a mocked HTTP backend.
//!
//! Wiremock stands in for the Wikipedia and arXiv APIs to validate payload
//! parsing, retry-then-succeed behavior, and retry exhaustion without
//! touching the network.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use vera::tools::wikipedia::WikipediaSearch;
use vera::tools::{arxiv::ArxivSearch, RetryPolicy, SearchProvider, SearchRegistry};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(4),
    }
}

fn wikipedia_payload() -> serde_json::Value {
    json!({
        "query": {
            "search": [
                {
                    "title": "Quantum computing",
                    "snippet": "<span class=\"searchmatch\">Quantum</span> computing is the study of &quot;qubits&quot;",
                    "pageid": 25220
                },
                {
                    "title": "Quantum supremacy",
                    "snippet": "A milestone in <span class=\"searchmatch\">quantum</span> computation",
                    "pageid": 58773
                }
            ]
        }
    })
}

const ARXIV_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query Results</title>
  <entry>
    <id>http://arxiv.org/abs/2301.01234v2</id>
    <title>Surface Codes in Practice</title>
    <summary>An empirical evaluation of surface code decoders.</summary>
  </entry>
</feed>"#;

// ============= Wikipedia =============

#[tokio::test]
async fn test_wikipedia_parses_and_strips_markup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("list", "search"))
        .and(query_param("srsearch", "quantum computing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wikipedia_payload()))
        .mount(&server)
        .await;

    let provider = WikipediaSearch::new(3, "vera-test/0.0".to_string())
        .with_api_base(format!("{}/w/api.php", server.uri()));

    let results = provider.search("quantum computing", 5).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].provider, "wikipedia");
    assert_eq!(results[0].title, "Quantum computing");
    assert_eq!(
        results[0].snippet,
        "Quantum computing is the study of \"qubits\""
    );
    assert_eq!(
        results[0].url,
        "https://en.wikipedia.org/wiki/Quantum_computing"
    );
}

#[tokio::test]
async fn test_wikipedia_recovers_after_transient_errors() {
    let server = MockServer::start().await;

    // Two failures, then a healthy response: inside the 3-attempt budget.
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wikipedia_payload()))
        .mount(&server)
        .await;

    let provider = WikipediaSearch::new(3, "vera-test/0.0".to_string())
        .with_api_base(format!("{}/w/api.php", server.uri()))
        .with_retry_policy(fast_retry(3));

    let mut registry = SearchRegistry::new(5);
    registry.register(Arc::new(provider));

    let results = registry.aggregate("quantum computing").await;
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_wikipedia_exhausts_retry_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let provider = WikipediaSearch::new(3, "vera-test/0.0".to_string())
        .with_api_base(format!("{}/w/api.php", server.uri()))
        .with_retry_policy(fast_retry(3));

    let mut registry = SearchRegistry::new(5);
    registry.register(Arc::new(provider));

    // The provider is excluded, not fatal: aggregation yields empty.
    let results = registry.aggregate("quantum computing").await;
    assert!(results.is_empty());
    // The .expect(3) above verifies exactly three attempts on server drop.
}

#[tokio::test]
async fn test_wikipedia_malformed_payload_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let provider = WikipediaSearch::new(3, "vera-test/0.0".to_string())
        .with_api_base(format!("{}/w/api.php", server.uri()));

    let outcome = provider.search("q", 5).await;
    assert!(outcome.is_err());
}

// ============= arXiv =============

#[tokio::test]
async fn test_arxiv_parses_atom_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("search_query", "all:surface codes"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(ARXIV_FEED, "application/atom+xml"),
        )
        .mount(&server)
        .await;

    let provider = ArxivSearch::new("vera-test/0.0".to_string())
        .with_api_base(format!("{}/api/query", server.uri()));

    let results = provider.search("surface codes", 5).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].provider, "arxiv");
    assert_eq!(results[0].title, "Surface Codes in Practice");
    assert_eq!(results[0].url, "http://arxiv.org/abs/2301.01234v2");
    assert!(results[0].snippet.contains("surface code decoders"));
}

#[tokio::test]
async fn test_arxiv_empty_feed_is_valid() {
    let server = MockServer::start().await;
    let empty = r#"<?xml version="1.0"?><feed xmlns="http://www.w3.org/2005/Atom"><title>none</title></feed>"#;
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(empty, "application/atom+xml"))
        .mount(&server)
        .await;

    let provider = ArxivSearch::new("vera-test/0.0".to_string())
        .with_api_base(format!("{}/api/query", server.uri()));

    let results = provider.search("nothing matches this", 5).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_arxiv_recovers_after_transient_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ARXIV_FEED, "application/atom+xml"))
        .mount(&server)
        .await;

    let provider = ArxivSearch::new("vera-test/0.0".to_string())
        .with_api_base(format!("{}/api/query", server.uri()))
        .with_retry_policy(fast_retry(3));

    let mut registry = SearchRegistry::new(5);
    registry.register(Arc::new(provider));

    let results = registry.aggregate("surface codes").await;
    assert_eq!(results.len(), 1);
}
