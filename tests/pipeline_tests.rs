//! End-to-end pipeline tests with scripted model responses and mock
//! providers.
//!
//! These exercise the full state machine: aggregation with failure
//! isolation, filter fallback, the bounded synthesis/validation retry loop,
//! and the empty-results short-circuit.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vera::llm::{ChatMessage, LLMClient};
use vera::research::{ResearchPipeline, NO_SOURCES_ERROR};
use vera::tools::{RetryPolicy, SearchProvider, SearchRegistry};
use vera::types::{AppError, SearchResult};

// ============= Test Doubles =============

/// LLM whose responses are played back in call order.
struct ScriptedLlm {
    responses: Mutex<VecDeque<String>>,
    calls: AtomicU32,
}

impl ScriptedLlm {
    fn new(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            calls: AtomicU32::new(0),
        })
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMClient for ScriptedLlm {
    async fn invoke(&self, _messages: &[ChatMessage]) -> vera::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::LLM("script exhausted: unexpected model call".to_string()))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Provider returning a fixed result set.
struct FixedProvider {
    name: &'static str,
    count: usize,
}

#[async_trait]
impl SearchProvider for FixedProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn search(&self, _query: &str, _max: usize) -> vera::Result<Vec<SearchResult>> {
        Ok((0..self.count)
            .map(|i| {
                SearchResult::new(
                    format!("{}-{}", self.name, i + 1),
                    format!("https://example.com/{}/{}", self.name, i + 1),
                    format!("snippet from {}", self.name),
                    self.name,
                )
            })
            .collect())
    }
}

/// Provider that always fails, with a fast retry budget.
struct BrokenProvider;

#[async_trait]
impl SearchProvider for BrokenProvider {
    fn name(&self) -> &str {
        "broken"
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    async fn search(&self, _query: &str, _max: usize) -> vera::Result<Vec<SearchResult>> {
        Err(AppError::Search("connection refused".to_string()))
    }
}

fn three_provider_registry() -> Arc<SearchRegistry> {
    let mut registry = SearchRegistry::new(5);
    registry.register(Arc::new(FixedProvider {
        name: "duckduckgo",
        count: 2,
    }));
    registry.register(Arc::new(FixedProvider {
        name: "wikipedia",
        count: 2,
    }));
    registry.register(Arc::new(FixedProvider {
        name: "arxiv",
        count: 2,
    }));
    Arc::new(registry)
}

/// A synthesis document that passes every schema check.
fn valid_synthesis(sources_found: usize, sources_used: usize) -> String {
    serde_json::json!({
        "topic": "Quantum Computing",
        "query": "quantum computing",
        "summary": "Quantum computing exploits superposition and entanglement to deliver \
                    speedups on factoring, simulation, and optimization workloads.",
        "findings": [
            {
                "claim": "Qubits encode superpositions of basis states",
                "evidence": "Consistent across encyclopedia and paper sources",
                "confidence": 0.9,
                "citations": [{
                    "author": "Unknown",
                    "title": "Quantum Computing Overview",
                    "url": "https://example.com/qc",
                    "year": 2023,
                    "source_type": "paper"
                }]
            },
            {
                "claim": "Error correction dominates current research",
                "evidence": "Multiple recent papers focus on logical qubits",
                "confidence": 0.8,
                "citations": []
            }
        ],
        "sources": [],
        "tools_used": ["duckduckgo", "wikipedia", "arxiv"],
        "metadata": {
            "query_time_seconds": 0,
            "sources_found": sources_found,
            "sources_used": sources_used,
            "tools_used": ["duckduckgo", "wikipedia", "arxiv"],
            "parse_success": true,
            "retry_count": 0
        }
    })
    .to_string()
}

// ============= Scenarios =============

#[tokio::test]
async fn test_happy_path_first_attempt() {
    // 3 providers x 2 results; filter keeps [1, 3, 4]; synthesis valid on
    // the first attempt.
    let llm = ScriptedLlm::new(&["[1, 3, 4]", &valid_synthesis(6, 3)]);
    let pipeline = ResearchPipeline::new(llm.clone(), three_provider_registry());

    let report = pipeline.run("quantum computing").await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.sources_found, 6);
    assert_eq!(report.sources_used, 3);
    assert_eq!(report.retry_count, 0);
    assert_eq!(report.tools_used, ["duckduckgo", "wikipedia", "arxiv"]);
    assert_eq!(llm.call_count(), 2);

    let summary = report.output.unwrap();
    assert_eq!(summary.metadata.sources_found, 6);
    assert_eq!(summary.metadata.sources_used, 3);
    assert_eq!(summary.metadata.retry_count, 0);
    assert!(summary.metadata.parse_success);
}

#[tokio::test]
async fn test_malformed_twice_then_valid() {
    let llm = ScriptedLlm::new(&[
        "[1, 2, 3]",
        "this is not json",
        "{\"still\": \"not a summary\"",
        &valid_synthesis(6, 3),
    ]);
    let pipeline = ResearchPipeline::new(llm.clone(), three_provider_registry());

    let report = pipeline.run("quantum computing").await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.retry_count, 2);
    // 1 filter call + 3 synthesis attempts.
    assert_eq!(llm.call_count(), 4);

    let summary = report.output.unwrap();
    assert_eq!(summary.metadata.retry_count, 2);
    assert!(summary.metadata.parse_success);
}

#[tokio::test]
async fn test_retry_budget_exhausted() {
    let llm = ScriptedLlm::new(&["[1, 2]", "garbage one", "garbage two", "garbage three"]);
    let pipeline = ResearchPipeline::new(llm.clone(), three_provider_registry());

    let report = pipeline.run("quantum computing").await.unwrap();

    assert!(!report.is_success());
    assert!(report.output.is_none());
    assert!(report.error.contains("JSON parse error"));
    // Diagnostics carry the last raw synthesis for inspection.
    assert_eq!(report.raw_synthesis, "garbage three");
    // retry_count stays within the budget...
    assert_eq!(report.retry_count, 2);
    // ...and exactly MAX_VALIDATION_RETRIES + 1 synthesis attempts ran
    // (plus the one filter call). A further attempt would have drained the
    // script and surfaced as an Err above.
    assert_eq!(llm.call_count(), 4);
}

#[tokio::test]
async fn test_all_providers_failing_short_circuits() {
    let mut registry = SearchRegistry::new(5);
    registry.register(Arc::new(BrokenProvider));

    let llm = ScriptedLlm::new(&[]);
    let pipeline = ResearchPipeline::new(llm.clone(), Arc::new(registry));

    let report = pipeline.run("anything").await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.error, NO_SOURCES_ERROR);
    assert_eq!(report.sources_found, 0);
    assert_eq!(report.sources_used, 0);
    // Neither the filter nor the synthesizer may call the model.
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_filter_fallback_keeps_all_in_order() {
    let llm = ScriptedLlm::new(&[
        "I would keep the first and third results",
        &valid_synthesis(6, 6),
    ]);
    let pipeline = ResearchPipeline::new(llm.clone(), three_provider_registry());

    let report = pipeline.run("quantum computing").await.unwrap();

    assert!(report.is_success());
    // Fallback keeps everything, so used == found.
    assert_eq!(report.sources_found, 6);
    assert_eq!(report.sources_used, 6);
}

#[tokio::test]
async fn test_aggregator_isolates_failing_provider() {
    let mut registry = SearchRegistry::new(5);
    registry.register(Arc::new(FixedProvider {
        name: "duckduckgo",
        count: 2,
    }));
    registry.register(Arc::new(BrokenProvider));
    registry.register(Arc::new(FixedProvider {
        name: "arxiv",
        count: 2,
    }));

    let results = registry.aggregate("quantum computing").await;

    // Union of the two healthy providers, still in invocation order.
    assert_eq!(results.len(), 4);
    let providers: Vec<&str> = results.iter().map(|r| r.provider.as_str()).collect();
    assert_eq!(providers, ["duckduckgo", "duckduckgo", "arxiv", "arxiv"]);
}

#[tokio::test]
async fn test_llm_transport_error_surfaces_as_hard_failure() {
    // An empty script makes the first filter call fail at the transport
    // level; that is an environment fault, not a recoverable parse failure.
    let llm = ScriptedLlm::new(&[]);
    let pipeline = ResearchPipeline::new(llm, three_provider_registry());

    let outcome = pipeline.run("quantum computing").await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn test_empty_model_synthesis_fails_without_retry() {
    // The model returns an empty string; there is nothing to retry against,
    // so exactly one synthesis attempt runs.
    let llm = ScriptedLlm::new(&["[1]", ""]);
    let pipeline = ResearchPipeline::new(llm.clone(), three_provider_registry());

    let report = pipeline.run("quantum computing").await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.error, "empty synthesis");
    assert_eq!(report.retry_count, 0);
    assert_eq!(llm.call_count(), 2);
}
