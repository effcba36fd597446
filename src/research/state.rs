//! Pipeline state, stage deltas, and the run report.
//!
//! The authoritative [`ResearchState`] is owned exclusively by the pipeline.
//! Stages never mutate it: each consumes a snapshot and hands back a
//! [`StageUpdate`] delta, which the pipeline merges with
//! [`ResearchState::apply`]. That keeps every transition reproducible in
//! isolation, retries included.

use crate::types::{ResearchSummary, SearchResult};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Fanning the query out to search providers.
    Searching,
    /// LLM relevance filtering of raw results.
    Filtering,
    /// LLM structured synthesis.
    Synthesizing,
    /// Parsing and schema validation of the synthesis.
    Validating,
    /// Terminal: a validated summary was produced.
    Done,
    /// Terminal: the run failed; the state carries the error.
    Failed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Searching => "searching",
            Stage::Filtering => "filtering",
            Stage::Synthesizing => "synthesizing",
            Stage::Validating => "validating",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Mutable state threaded through a single pipeline run.
#[derive(Debug)]
pub struct ResearchState {
    /// The user's query.
    pub query: String,
    /// Raw results from the aggregator.
    pub search_results: Vec<SearchResult>,
    /// Results surviving the relevance filter.
    pub filtered_results: Vec<SearchResult>,
    /// Latest raw synthesis text.
    pub synthesis_raw: String,
    /// Validated output, set exactly once on success.
    pub validated_output: Option<ResearchSummary>,
    /// Provider names that contributed results, first-seen order.
    pub tools_used: Vec<String>,
    /// Total raw results found.
    pub sources_found: usize,
    /// Results that survived filtering.
    pub sources_used: usize,
    /// Synthesis retries consumed so far. Monotonically non-decreasing.
    pub retry_count: u32,
    /// When the run started.
    pub started_at: Instant,
    /// Last recorded error, empty when none.
    pub error: String,
}

impl ResearchState {
    /// Fresh state for a query, with the start time recorded.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            search_results: Vec::new(),
            filtered_results: Vec::new(),
            synthesis_raw: String::new(),
            validated_output: None,
            tools_used: Vec::new(),
            sources_found: 0,
            sources_used: 0,
            retry_count: 0,
            started_at: Instant::now(),
            error: String::new(),
        }
    }

    /// Wall-clock seconds since the run started.
    pub fn elapsed_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    /// Merge a stage's delta into the authoritative state.
    pub fn apply(&mut self, update: StageUpdate) {
        if let Some(results) = update.search_results {
            self.search_results = results;
        }
        if let Some(filtered) = update.filtered_results {
            self.filtered_results = filtered;
        }
        if let Some(raw) = update.synthesis_raw {
            self.synthesis_raw = raw;
        }
        if let Some(output) = update.validated_output {
            self.validated_output = Some(output);
        }
        if let Some(tools) = update.tools_used {
            self.tools_used = tools;
        }
        if let Some(found) = update.sources_found {
            self.sources_found = found;
        }
        if let Some(used) = update.sources_used {
            self.sources_used = used;
        }
        if let Some(retries) = update.retry_count {
            debug_assert!(retries >= self.retry_count);
            self.retry_count = retries;
        }
        if let Some(error) = update.error {
            self.error = error;
        }
    }

    /// Freeze this state into the user-facing report.
    pub fn into_report(self) -> RunReport {
        let elapsed_seconds = self.elapsed_seconds();
        RunReport {
            query: self.query,
            output: self.validated_output,
            error: self.error,
            raw_synthesis: self.synthesis_raw,
            retry_count: self.retry_count,
            sources_found: self.sources_found,
            sources_used: self.sources_used,
            tools_used: self.tools_used,
            elapsed_seconds,
        }
    }
}

/// Partial state update returned by one stage.
///
/// `None` fields leave the authoritative state untouched.
#[derive(Debug, Default)]
pub struct StageUpdate {
    /// Replacement raw results.
    pub search_results: Option<Vec<SearchResult>>,
    /// Replacement filtered results.
    pub filtered_results: Option<Vec<SearchResult>>,
    /// Replacement synthesis text.
    pub synthesis_raw: Option<String>,
    /// Validated output to set.
    pub validated_output: Option<ResearchSummary>,
    /// Replacement provider list.
    pub tools_used: Option<Vec<String>>,
    /// Replacement found-count.
    pub sources_found: Option<usize>,
    /// Replacement used-count.
    pub sources_used: Option<usize>,
    /// New retry count. Must not decrease.
    pub retry_count: Option<u32>,
    /// Error to record.
    pub error: Option<String>,
}

/// Outcome of one pipeline run: a validated summary, or a structured
/// failure record with diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// The original query.
    pub query: String,
    /// The validated summary, present only on success.
    pub output: Option<ResearchSummary>,
    /// Last recorded error, empty on success.
    pub error: String,
    /// Last raw synthesis text, kept for operator inspection on failure.
    pub raw_synthesis: String,
    /// Synthesis retries consumed.
    pub retry_count: u32,
    /// Total raw results found.
    pub sources_found: usize,
    /// Results that survived filtering.
    pub sources_used: usize,
    /// Providers that contributed results.
    pub tools_used: Vec<String>,
    /// Wall-clock seconds for the whole run.
    pub elapsed_seconds: f64,
}

impl RunReport {
    /// Whether the run produced a validated summary.
    pub fn is_success(&self) -> bool {
        self.output.is_some()
    }
}
