//! The research pipeline: search, filter, synthesize, validate.
//!
//! [`ResearchPipeline`] owns the run: it fans the query out through the
//! search registry, asks the model to rank the results, asks it again for a
//! structured summary, and validates that summary against the
//! [`crate::types::ResearchSummary`] schema, retrying synthesis up to
//! [`MAX_VALIDATION_RETRIES`] times before reporting failure.

/// LLM relevance filtering.
pub mod filter;
/// The pipeline controller and state machine.
pub mod pipeline;
/// Pipeline state, stage deltas, and the run report.
pub mod state;
/// LLM structured synthesis.
pub mod synthesize;
/// Parsing and schema validation of syntheses.
pub mod validate;

pub use filter::RelevanceFilter;
pub use pipeline::{ResearchPipeline, MAX_VALIDATION_RETRIES, NO_SOURCES_ERROR};
pub use state::{ResearchState, RunReport, Stage, StageUpdate};
pub use synthesize::{SynthesisContext, Synthesizer};
pub use validate::{Validation, Validator, EMPTY_SYNTHESIS_ERROR};
