//! The research pipeline state machine.
//!
//! Stages run strictly in sequence (searching, filtering, synthesizing,
//! validating) with one feedback edge: a failed validation re-enters
//! synthesis while retry budget remains. The feedback edge is a bounded
//! loop with an explicit counter, so the maximum number of model calls per
//! run is statically known.

use crate::llm::LLMClient;
use crate::research::filter::RelevanceFilter;
use crate::research::state::{ResearchState, RunReport, Stage, StageUpdate};
use crate::research::synthesize::{SynthesisContext, Synthesizer};
use crate::research::validate::Validator;
use crate::tools::SearchRegistry;
use crate::types::{Result, SearchResult};
use std::sync::Arc;

/// Synthesis retries permitted after the first validation failure.
pub const MAX_VALIDATION_RETRIES: u32 = 2;

/// Run-level error recorded when filtering leaves nothing to synthesize.
pub const NO_SOURCES_ERROR: &str = "no search results available";

/// Orchestrates one research run per query.
pub struct ResearchPipeline {
    registry: Arc<SearchRegistry>,
    filter: RelevanceFilter,
    synthesizer: Synthesizer,
    max_retries: u32,
}

impl ResearchPipeline {
    /// Create a pipeline over the given model client and provider registry.
    pub fn new(llm: Arc<dyn LLMClient>, registry: Arc<SearchRegistry>) -> Self {
        Self {
            registry,
            filter: RelevanceFilter::new(Arc::clone(&llm)),
            synthesizer: Synthesizer::new(llm),
            max_retries: MAX_VALIDATION_RETRIES,
        }
    }

    /// Override the retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Execute the full pipeline for a query.
    ///
    /// Pipeline-internal failures (provider exhaustion, unusable synthesis,
    /// no sources) are captured into the returned [`RunReport`]; only
    /// environment faults such as LLM transport errors surface as `Err`.
    pub async fn run(&self, query: &str) -> Result<RunReport> {
        let mut state = ResearchState::new(query);

        // SEARCHING
        tracing::info!(stage = %Stage::Searching, query, "running stage");
        let results = self.registry.aggregate(query).await;
        state.apply(StageUpdate {
            tools_used: Some(unique_providers(&results)),
            sources_found: Some(results.len()),
            search_results: Some(results),
            ..Default::default()
        });

        // FILTERING
        tracing::info!(stage = %Stage::Filtering, candidates = state.sources_found, "running stage");
        let filtered = self
            .filter
            .filter(&state.query, &state.search_results)
            .await?;
        state.apply(StageUpdate {
            sources_used: Some(filtered.len()),
            filtered_results: Some(filtered),
            ..Default::default()
        });

        if state.filtered_results.is_empty() {
            state.apply(StageUpdate {
                error: Some(NO_SOURCES_ERROR.to_string()),
                ..Default::default()
            });
            tracing::error!(stage = %Stage::Failed, error = %state.error, "nothing to synthesize");
            return Ok(state.into_report());
        }

        // SYNTHESIZING <-> VALIDATING, bounded by the retry budget.
        loop {
            tracing::info!(
                stage = %Stage::Synthesizing,
                attempt = state.retry_count + 1,
                "running stage"
            );
            let ctx = SynthesisContext {
                tools_used: state.tools_used.clone(),
                sources_found: state.sources_found,
                sources_used: state.sources_used,
                retry_count: state.retry_count,
            };
            let raw = self
                .synthesizer
                .synthesize(&state.query, &state.filtered_results, &ctx)
                .await?;
            state.apply(StageUpdate {
                synthesis_raw: Some(raw),
                ..Default::default()
            });

            tracing::info!(stage = %Stage::Validating, "running stage");
            let validation = Validator::validate(
                &state.synthesis_raw,
                state.retry_count,
                state.elapsed_seconds(),
            );

            if validation.output.is_some() {
                state.apply(StageUpdate {
                    validated_output: validation.output,
                    error: Some(String::new()),
                    ..Default::default()
                });
                tracing::info!(
                    stage = %Stage::Done,
                    retries = state.retry_count,
                    "run complete"
                );
                return Ok(state.into_report());
            }

            state.apply(StageUpdate {
                error: validation.error,
                ..Default::default()
            });

            // Empty synthesis has nothing to retry against.
            if state.synthesis_raw.is_empty() {
                tracing::error!(stage = %Stage::Failed, error = %state.error, "run failed");
                return Ok(state.into_report());
            }

            if state.retry_count >= self.max_retries {
                tracing::error!(
                    stage = %Stage::Failed,
                    retries = state.retry_count,
                    error = %state.error,
                    "max retries reached"
                );
                return Ok(state.into_report());
            }

            // Carry the incremented count into the next synthesis attempt.
            state.apply(StageUpdate {
                retry_count: Some(validation.retry_count),
                ..Default::default()
            });
            tracing::info!(attempt = state.retry_count + 1, "retrying synthesis");
        }
    }
}

/// Provider names that contributed results, deduplicated, first-seen order.
fn unique_providers(results: &[SearchResult]) -> Vec<String> {
    let mut providers: Vec<String> = Vec::new();
    for result in results {
        if !providers.iter().any(|p| p == &result.provider) {
            providers.push(result.provider.clone());
        }
    }
    providers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_providers_first_seen_order() {
        let results = vec![
            SearchResult::new("a", "", "s", "wikipedia"),
            SearchResult::new("b", "", "s", "duckduckgo"),
            SearchResult::new("c", "", "s", "wikipedia"),
        ];
        assert_eq!(unique_providers(&results), ["wikipedia", "duckduckgo"]);
    }

    #[test]
    fn test_unique_providers_empty() {
        assert!(unique_providers(&[]).is_empty());
    }
}
