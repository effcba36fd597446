//! LLM structured synthesis.
//!
//! The synthesizer instructs the model to emit ONLY a JSON object matching
//! the [`crate::types::ResearchSummary`] shape and strips markdown code
//! fences from the reply. It performs no JSON validation; that is the
//! validator's job.

use crate::llm::LLMClient;
use crate::types::{Result, SearchResult};
use std::sync::Arc;

const SYNTHESIS_SYSTEM: &str =
    "You output only valid JSON. Never use markdown code fences.";

/// Run-context values interpolated into the synthesis prompt so the model
/// can fill the metadata object consistently with what actually happened.
#[derive(Debug, Clone, Default)]
pub struct SynthesisContext {
    /// Providers that contributed results.
    pub tools_used: Vec<String>,
    /// Total raw results found.
    pub sources_found: usize,
    /// Results that survived filtering.
    pub sources_used: usize,
    /// Retries consumed so far.
    pub retry_count: u32,
}

/// Structured-summary generator backed by a language model.
pub struct Synthesizer {
    llm: Arc<dyn LLMClient>,
}

impl Synthesizer {
    /// Create a synthesizer over the given model client.
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    /// Generate raw summary JSON text from the filtered sources.
    ///
    /// Empty input returns an empty string without a model call; the
    /// pipeline records the no-sources error for that case.
    pub async fn synthesize(
        &self,
        query: &str,
        filtered: &[SearchResult],
        ctx: &SynthesisContext,
    ) -> Result<String> {
        if filtered.is_empty() {
            tracing::warn!("no filtered results to synthesize");
            return Ok(String::new());
        }

        let prompt = build_synthesis_prompt(query, filtered, ctx);
        let response = self
            .llm
            .generate_with_system(SYNTHESIS_SYSTEM, &prompt)
            .await?;

        let raw = strip_code_fences(response.trim());
        tracing::info!(chars = raw.len(), "generated synthesis");
        Ok(raw)
    }
}

fn build_synthesis_prompt(
    query: &str,
    filtered: &[SearchResult],
    ctx: &SynthesisContext,
) -> String {
    let sources = filtered
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let url = if r.url.is_empty() { "N/A" } else { &r.url };
            format!(
                "[{}] Source: {} | Title: {} | URL: {}\n{}",
                i + 1,
                r.provider,
                r.title,
                url,
                r.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let tools_json =
        serde_json::to_string(&ctx.tools_used).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"You are a research assistant. Synthesize the following sources into a structured research summary.

Query: {query}

Sources:
{sources}

Return ONLY valid JSON (no markdown, no code fences) matching this exact schema:
{{
    "topic": "high-level topic name",
    "query": "{query}",
    "summary": "comprehensive synthesis paragraph (at least 50 characters)",
    "findings": [
        {{
            "claim": "key finding or claim",
            "evidence": "supporting evidence from sources",
            "confidence": 0.85,
            "citations": [
                {{
                    "author": "author name or Unknown",
                    "title": "source title",
                    "url": "source url or empty string",
                    "year": null,
                    "source_type": "paper|article|wiki|web"
                }}
            ]
        }}
    ],
    "sources": [
        {{
            "author": "author name or Unknown",
            "title": "source title",
            "url": "source url or empty string",
            "year": null,
            "source_type": "paper|article|wiki|web"
        }}
    ],
    "tools_used": {tools_json},
    "metadata": {{
        "query_time_seconds": 0,
        "sources_found": {sources_found},
        "sources_used": {sources_used},
        "tools_used": {tools_json},
        "parse_success": true,
        "retry_count": {retry_count}
    }}
}}

CRITICAL: Return ONLY the JSON object. No explanation, no markdown fences, no extra text.
Include at least 2-3 findings with citations. Set confidence between 0.0 and 1.0 based on evidence strength.
Use source_type values: "paper" for arxiv, "wiki" for wikipedia, "web" for duckduckgo and scraped pages, "article" for news."#,
        sources_found = ctx.sources_found,
        sources_used = ctx.sources_used,
        retry_count = ctx.retry_count,
    )
}

/// Remove a markdown code fence wrapper, if present. Lines consisting of a
/// fence marker are dropped; everything else is kept verbatim.
fn strip_code_fences(text: &str) -> String {
    if !text.starts_with("```") {
        return text.to_string();
    }
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fences_stripped() {
        let fenced = "```json\n{\"topic\": \"x\"}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"topic\": \"x\"}");
    }

    #[test]
    fn test_bare_fences_stripped() {
        let fenced = "```\n{}\n```";
        assert_eq!(strip_code_fences(fenced), "{}");
    }

    #[test]
    fn test_unfenced_text_unchanged() {
        let plain = "{\"topic\": \"x\"}";
        assert_eq!(strip_code_fences(plain), plain);
    }

    #[test]
    fn test_interior_backticks_survive() {
        let text = "{\"summary\": \"use `cargo test` here\"}";
        assert_eq!(strip_code_fences(text), text);
    }

    #[test]
    fn test_prompt_carries_run_context() {
        let ctx = SynthesisContext {
            tools_used: vec!["duckduckgo".to_string(), "arxiv".to_string()],
            sources_found: 6,
            sources_used: 3,
            retry_count: 1,
        };
        let filtered = vec![SearchResult::new("T", "http://x", "snip", "arxiv")];
        let prompt = build_synthesis_prompt("quantum computing", &filtered, &ctx);

        assert!(prompt.contains(r#""sources_found": 6"#));
        assert!(prompt.contains(r#""sources_used": 3"#));
        assert!(prompt.contains(r#""retry_count": 1"#));
        assert!(prompt.contains(r#"["duckduckgo","arxiv"]"#));
        assert!(prompt.contains("[1] Source: arxiv | Title: T | URL: http://x"));
    }

    #[test]
    fn test_prompt_marks_missing_urls() {
        let filtered = vec![SearchResult::new("T", "", "snip", "wikipedia")];
        let prompt =
            build_synthesis_prompt("q", &filtered, &SynthesisContext::default());
        assert!(prompt.contains("URL: N/A"));
    }
}
