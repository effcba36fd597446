//! # V.E.R.A - Validated Evidence Research Assistant
//!
//! A multi-provider research pipeline: a free-text query fans out to web,
//! encyclopedia, and academic paper search providers; a language model
//! deduplicates and ranks the results, then synthesizes them into a
//! structured summary; a strict schema validator accepts or rejects that
//! summary, retrying synthesis a bounded number of times before reporting
//! failure.
//!
//! ## Overview
//!
//! V.E.R.A can be used in two ways:
//!
//! 1. **As a CLI** - Run the `vera` binary for one-shot or interactive research
//! 2. **As a library** - Drive [`ResearchPipeline`] from your own Rust project
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vera::{ResearchPipeline, SearchRegistry, VeraConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = VeraConfig::load("vera.toml".as_ref())?;
//!     let llm = Arc::from(config.llm.build_client()?);
//!     let registry = Arc::new(SearchRegistry::with_default_providers(&config.search));
//!
//!     let pipeline = ResearchPipeline::new(llm, registry);
//!     let report = pipeline.run("quantum error correction").await?;
//!
//!     if let Some(summary) = report.output {
//!         println!("{}", summary.summary);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! SEARCHING -> FILTERING -> SYNTHESIZING -> VALIDATING -> DONE | FAILED
//!                                ^                |
//!                                +--- retry <-----+  (bounded, max 2)
//! ```
//!
//! Search providers run concurrently with per-provider retry budgets and
//! failure isolation; the rest of the pipeline is strictly sequential. All
//! failure modes are captured into the returned [`research::RunReport`];
//! the pipeline never panics or throws past its caller for an invalid
//! synthesis, an exhausted provider, or an empty result set.
//!
//! ## Modules
//!
//! - [`cli`] - Argument parsing and colored terminal output
//! - [`llm`] - LLM client trait and the Anthropic backend
//! - [`metrics`] - Per-query metrics and the JSONL sink
//! - [`research`] - The pipeline state machine and its stages
//! - [`tools`] - Search providers and the aggregating registry
//! - [`types`] - Domain models, schema validation, error types
//! - [`utils`] - TOML configuration

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// CLI parsing and terminal output.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Per-query metrics tracking.
pub mod metrics;
/// The research pipeline and its stages.
pub mod research;
/// Search providers and aggregation.
pub mod tools;
/// Core types and error handling.
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use llm::{AnthropicClient, ChatMessage, ChatRole, LLMClient};
pub use metrics::{MetricsSummary, MetricsTracker, QueryMetrics};
pub use research::{
    ResearchPipeline, ResearchState, RunReport, Stage, StageUpdate, MAX_VALIDATION_RETRIES,
};
pub use tools::{RetryPolicy, SearchProvider, SearchRegistry};
pub use types::{
    AppError, Citation, Finding, QueryMetadata, ResearchSummary, Result, SearchResult, SourceType,
    ValidationError,
};
pub use utils::VeraConfig;
