//! Parsing and schema validation of synthesized summaries.
//!
//! All outcomes flow through the [`Validation`] return value; the validator
//! never panics or returns an error for a bad document. Only the enumerated
//! parsing and schema failures count as retryable: they increment the
//! retry count. An empty synthesis has nothing to retry and leaves the
//! count unchanged.

use crate::types::ResearchSummary;
use serde_json::Value;

/// Error recorded when the synthesis text is empty.
pub const EMPTY_SYNTHESIS_ERROR: &str = "empty synthesis";

/// Outcome of one validation pass.
#[derive(Debug)]
pub struct Validation {
    /// The validated summary, present only on success.
    pub output: Option<ResearchSummary>,
    /// Retry count to carry forward: incremented on parse/schema failure,
    /// unchanged on success and on empty input.
    pub retry_count: u32,
    /// Failure description, absent on success.
    pub error: Option<String>,
}

impl Validation {
    fn failure(retry_count: u32, error: String) -> Self {
        Self {
            output: None,
            retry_count,
            error: Some(error),
        }
    }
}

/// Schema validator for raw synthesis text.
pub struct Validator;

impl Validator {
    /// Validate `raw` against the summary schema, injecting the measured
    /// timing and retry metadata before the schema check so the validated
    /// document reports what actually happened rather than the model's
    /// placeholders.
    pub fn validate(raw: &str, retry_count: u32, elapsed_seconds: f64) -> Validation {
        if raw.is_empty() {
            return Validation::failure(retry_count, EMPTY_SYNTHESIS_ERROR.to_string());
        }

        let mut data: Value = match serde_json::from_str(raw) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(attempt = retry_count + 1, error = %e, "synthesis parse failed");
                return Validation::failure(retry_count + 1, format!("JSON parse error: {e}"));
            }
        };

        inject_metadata(&mut data, retry_count, elapsed_seconds);

        let summary: ResearchSummary = match serde_json::from_value(data) {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(attempt = retry_count + 1, error = %e, "schema mismatch");
                return Validation::failure(retry_count + 1, format!("schema error: {e}"));
            }
        };

        if let Err(e) = summary.validate() {
            tracing::warn!(attempt = retry_count + 1, error = %e, "constraint violation");
            return Validation::failure(retry_count + 1, e.to_string());
        }

        tracing::info!("schema validation passed");
        Validation {
            output: Some(summary),
            retry_count,
            error: None,
        }
    }
}

/// Overwrite the metadata fields the pipeline computes itself.
fn inject_metadata(data: &mut Value, retry_count: u32, elapsed_seconds: f64) {
    let elapsed = (elapsed_seconds * 1000.0).round() / 1000.0;
    if let Some(metadata) = data.get_mut("metadata").and_then(Value::as_object_mut) {
        metadata.insert("query_time_seconds".to_string(), elapsed.into());
        metadata.insert("retry_count".to_string(), retry_count.into());
        metadata.insert("parse_success".to_string(), true.into());
    }
}
