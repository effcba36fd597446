//! Core domain types for the research pipeline.
//!
//! The structured output models ([`ResearchSummary`] and its components)
//! are what the synthesis stage asks the language model to produce and what
//! the validation stage checks. Field presence and types are enforced by
//! serde deserialization; value constraints (ranges, minimum lengths,
//! non-emptiness) are enforced by [`ResearchSummary::validate`].

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Maximum snippet length carried by a search result.
pub const MAX_SNIPPET_LEN: usize = 500;

/// Minimum length of a synthesized summary paragraph.
pub const MIN_SUMMARY_LEN: usize = 50;

/// Earliest publication year accepted in a citation.
pub const MIN_CITATION_YEAR: i32 = 1900;

// ============= Search Types =============

/// A single result returned by one search provider.
///
/// The same shape flows through the whole pipeline: the aggregator produces
/// these, the relevance filter selects a subset, and the synthesizer reads
/// the survivors. Construct through [`SearchResult::new`] so the snippet
/// bound holds everywhere downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    /// Title of the result.
    pub title: String,
    /// URL of the source, empty when the provider has none.
    #[serde(default)]
    pub url: String,
    /// Text snippet or summary, at most [`MAX_SNIPPET_LEN`] characters.
    pub snippet: String,
    /// Name of the provider that produced this result.
    pub provider: String,
}

impl SearchResult {
    /// Create a result, truncating the snippet to [`MAX_SNIPPET_LEN`].
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        let mut snippet: String = snippet.into();
        if snippet.chars().count() > MAX_SNIPPET_LEN {
            snippet = snippet.chars().take(MAX_SNIPPET_LEN).collect();
        }
        Self {
            title: title.into(),
            url: url.into(),
            snippet,
            provider: provider.into(),
        }
    }
}

// ============= Structured Output Types =============

/// Category of a cited source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Academic paper (arXiv and similar indexes).
    Paper,
    /// News or magazine article.
    Article,
    /// Encyclopedia entry.
    Wiki,
    /// General web page.
    #[default]
    Web,
}

/// Structured citation for a source used in the synthesis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    /// Author or publisher name.
    #[serde(default = "default_author")]
    pub author: String,
    /// Title of the cited work.
    pub title: String,
    /// URL to the source, empty when unknown.
    #[serde(default)]
    pub url: String,
    /// Publication year, if known. Must lie in
    /// `[MIN_CITATION_YEAR, current_year + 1]` when present.
    #[serde(default)]
    pub year: Option<i32>,
    /// Category of the source.
    #[serde(default)]
    pub source_type: SourceType,
}

fn default_author() -> String {
    "Unknown".to_string()
}

/// A single research finding with evidence and a confidence score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    /// The key finding or claim.
    pub claim: String,
    /// Supporting evidence or context from the sources.
    pub evidence: String,
    /// Confidence from 0.0 (speculative) to 1.0 (well-supported).
    pub confidence: f64,
    /// Sources backing this finding. May be empty.
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// Metrics captured while answering a query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryMetadata {
    /// Total wall-clock seconds for the query.
    pub query_time_seconds: f64,
    /// Search results retrieved across all providers.
    pub sources_found: usize,
    /// Sources that made it into the synthesis.
    pub sources_used: usize,
    /// Names of the providers invoked.
    #[serde(default)]
    pub tools_used: Vec<String>,
    /// RFC 3339 timestamp of query execution.
    #[serde(default = "default_timestamp")]
    pub timestamp: String,
    /// Whether validation succeeded.
    #[serde(default = "default_true")]
    pub parse_success: bool,
    /// Synthesis retries before validation passed.
    #[serde(default)]
    pub retry_count: u32,
}

fn default_timestamp() -> String {
    Utc::now().to_rfc3339()
}

fn default_true() -> bool {
    true
}

/// Complete, validated research output.
///
/// A value of this type only reaches callers after
/// [`ResearchSummary::validate`] has passed; partially valid documents are
/// never exposed by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchSummary {
    /// High-level research topic.
    pub topic: String,
    /// The original user query.
    pub query: String,
    /// Synthesized summary paragraph, at least [`MIN_SUMMARY_LEN`] characters.
    pub summary: String,
    /// Key findings extracted from the sources. Never empty.
    pub findings: Vec<Finding>,
    /// All citations used in the summary.
    #[serde(default)]
    pub sources: Vec<Citation>,
    /// Providers invoked during research.
    #[serde(default)]
    pub tools_used: Vec<String>,
    /// Query performance and provenance metadata.
    pub metadata: QueryMetadata,
}

impl ResearchSummary {
    /// Check value constraints that serde cannot express.
    ///
    /// Field presence and types are already guaranteed by deserialization;
    /// this verifies ranges, lengths, and non-emptiness.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let len = self.summary.chars().count();
        if len < MIN_SUMMARY_LEN {
            return Err(ValidationError::SummaryTooShort { len });
        }
        if self.findings.is_empty() {
            return Err(ValidationError::NoFindings);
        }
        for (index, finding) in self.findings.iter().enumerate() {
            if !(0.0..=1.0).contains(&finding.confidence) {
                return Err(ValidationError::ConfidenceOutOfRange {
                    index,
                    value: finding.confidence,
                });
            }
            for citation in &finding.citations {
                validate_citation_year(citation)?;
            }
        }
        for citation in &self.sources {
            validate_citation_year(citation)?;
        }
        if self.metadata.query_time_seconds < 0.0 {
            return Err(ValidationError::NegativeQueryTime {
                value: self.metadata.query_time_seconds,
            });
        }
        if self.metadata.sources_used > self.metadata.sources_found {
            return Err(ValidationError::SourceCountMismatch {
                used: self.metadata.sources_used,
                found: self.metadata.sources_found,
            });
        }
        Ok(())
    }
}

fn validate_citation_year(citation: &Citation) -> std::result::Result<(), ValidationError> {
    if let Some(year) = citation.year {
        let max = Utc::now().year() + 1;
        if year < MIN_CITATION_YEAR || year > max {
            return Err(ValidationError::YearOutOfRange { year, max });
        }
    }
    Ok(())
}

/// A value constraint violated by an otherwise well-formed summary.
///
/// Each variant is one enumerated, recoverable failure mode; the pipeline
/// treats these as retryable synthesis failures.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    /// The summary paragraph is shorter than [`MIN_SUMMARY_LEN`] characters.
    #[error("summary must be at least {MIN_SUMMARY_LEN} characters, got {len}")]
    SummaryTooShort {
        /// Observed character count.
        len: usize,
    },

    /// The findings list is empty.
    #[error("findings list must not be empty")]
    NoFindings,

    /// A finding's confidence lies outside `[0.0, 1.0]`.
    #[error("finding {index}: confidence {value} is not in [0.0, 1.0]")]
    ConfidenceOutOfRange {
        /// Index of the offending finding.
        index: usize,
        /// Observed confidence value.
        value: f64,
    },

    /// A citation year lies outside `[MIN_CITATION_YEAR, current_year + 1]`.
    #[error("citation year {year} is not in [{MIN_CITATION_YEAR}, {max}]")]
    YearOutOfRange {
        /// Observed year.
        year: i32,
        /// Upper bound at validation time.
        max: i32,
    },

    /// Query time is negative.
    #[error("query_time_seconds {value} is negative")]
    NegativeQueryTime {
        /// Observed value.
        value: f64,
    },

    /// More sources used than were found.
    #[error("sources_used {used} exceeds sources_found {found}")]
    SourceCountMismatch {
        /// Sources reported used.
        used: usize,
        /// Sources reported found.
        found: usize,
    },
}

// ============= Error Types =============

/// Application-level error.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Failure talking to the language model.
    #[error("LLM error: {0}")]
    LLM(String),

    /// Failure in a search provider call.
    #[error("search error: {0}")]
    Search(String),

    /// Invalid or unusable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure outside the validation path.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AppError>;
