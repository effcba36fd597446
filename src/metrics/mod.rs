//! Per-query metrics tracking.
//!
//! Each run appends one JSONL record to the metrics log; the tracker also
//! keeps the session's records in memory for the aggregate summary printed
//! at exit. Writing the log is best-effort: a sink failure is logged and
//! never fails a run.

use crate::research::RunReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use uuid::Uuid;

/// Metrics for a single query execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMetrics {
    /// Unique id for this run.
    pub run_id: Uuid,
    /// The query text.
    pub query: String,
    /// When the run finished.
    pub timestamp: DateTime<Utc>,
    /// Wall-clock seconds for the run.
    pub total_seconds: f64,
    /// Raw results found across providers.
    pub sources_found: usize,
    /// Results that survived filtering.
    pub sources_used: usize,
    /// Providers that contributed results.
    pub tools_used: Vec<String>,
    /// Whether the run produced a validated summary.
    pub parse_success: bool,
    /// Synthesis retries consumed.
    pub retry_count: u32,
    /// Last error, empty on success.
    pub error: String,
}

impl QueryMetrics {
    /// Capture metrics from a finished run.
    pub fn from_report(report: &RunReport) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            query: report.query.clone(),
            timestamp: Utc::now(),
            total_seconds: (report.elapsed_seconds * 1000.0).round() / 1000.0,
            sources_found: report.sources_found,
            sources_used: report.sources_used,
            tools_used: report.tools_used.clone(),
            parse_success: report.is_success(),
            retry_count: report.retry_count,
            error: report.error.clone(),
        }
    }
}

/// Aggregate statistics across a session's queries.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetricsSummary {
    /// Number of queries tracked.
    pub total_queries: usize,
    /// Queries that produced a validated summary.
    pub successful_queries: usize,
    /// Validation success rate as a percentage.
    pub parse_success_rate_pct: f64,
    /// Mean wall-clock seconds per query.
    pub avg_query_time_seconds: f64,
    /// Mean raw results found per query.
    pub avg_sources_per_query: f64,
    /// Synthesis retries across all queries.
    pub total_retries: u64,
    /// Per-provider usage counts.
    pub tool_usage: BTreeMap<String, usize>,
}

/// Tracks and persists query metrics for a session.
pub struct MetricsTracker {
    log_file: PathBuf,
    queries: Vec<QueryMetrics>,
}

impl MetricsTracker {
    /// Create a tracker writing to the given JSONL file.
    pub fn new(log_file: PathBuf) -> Self {
        Self {
            log_file,
            queries: Vec::new(),
        }
    }

    /// Record one run: keep it for the session summary and append it to the
    /// log file. Sink failures are logged, never propagated.
    pub fn record(&mut self, metrics: QueryMetrics) {
        if let Err(e) = self.append_to_log(&metrics) {
            tracing::error!(error = %e, path = %self.log_file.display(), "failed to write metrics log");
        }
        self.queries.push(metrics);
    }

    fn append_to_log(&self, metrics: &QueryMetrics) -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;
        let line = serde_json::to_string(metrics)?;
        writeln!(file, "{line}")
    }

    /// Number of queries recorded this session.
    pub fn query_count(&self) -> usize {
        self.queries.len()
    }

    /// Aggregate statistics across all recorded queries.
    pub fn summary(&self) -> MetricsSummary {
        let total = self.queries.len();
        if total == 0 {
            return MetricsSummary::default();
        }

        let successful = self.queries.iter().filter(|q| q.parse_success).count();
        let avg_time =
            self.queries.iter().map(|q| q.total_seconds).sum::<f64>() / total as f64;
        let avg_sources =
            self.queries.iter().map(|q| q.sources_found).sum::<usize>() as f64 / total as f64;
        let total_retries = self.queries.iter().map(|q| u64::from(q.retry_count)).sum();

        let mut tool_usage: BTreeMap<String, usize> = BTreeMap::new();
        for query in &self.queries {
            for tool in &query.tools_used {
                *tool_usage.entry(tool.clone()).or_default() += 1;
            }
        }

        MetricsSummary {
            total_queries: total,
            successful_queries: successful,
            parse_success_rate_pct: (successful as f64 / total as f64 * 1000.0).round() / 10.0,
            avg_query_time_seconds: (avg_time * 100.0).round() / 100.0,
            avg_sources_per_query: (avg_sources * 10.0).round() / 10.0,
            total_retries,
            tool_usage,
        }
    }
}
