//! Colored output helpers for the CLI.

use crate::metrics::MetricsSummary;
use crate::research::RunReport;
use crate::types::ResearchSummary;
use owo_colors::OwoColorize;

/// How much of the raw synthesis to show when a run fails.
const RAW_PREVIEW_CHARS: usize = 500;

/// Output style configuration.
pub struct Output {
    /// Whether to use colored output.
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled.
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled.
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the V.E.R.A banner.
    pub fn banner(&self) {
        if self.colored {
            println!(
                "\n   {}\n   {}\n   {}\n   {}\n   {}",
                "__     _______ ____      _    ".bright_cyan().bold(),
                "\\ \\   / / ____|  _ \\    / \\   ".bright_cyan().bold(),
                " \\ \\ / /|  _| | |_) |  / _ \\  ".cyan().bold(),
                "  \\ V / | |___|  _ <  / ___ \\ ".blue().bold(),
                "   \\_/  |_____|_| \\_\\/_/   \\_\\".blue().bold(),
            );
            println!(
                "\n   {} {}\n",
                "Validated Evidence Research Assistant".bright_white().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            println!(
                r#"
__     _______ ____      _
\ \   / / ____|  _ \    / \
 \ \ / /|  _| | |_) |  / _ \
  \ V / | |___|  _ <  / ___ \
   \_/  |_____|_| \_\/_/   \_\

   Validated Evidence Research Assistant v{}
"#,
                env!("CARGO_PKG_VERSION")
            );
        }
    }

    /// Print a success message with a checkmark.
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message.
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message.
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section.
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Render a validated research summary.
    pub fn research_summary(&self, summary: &ResearchSummary) {
        self.header("RESEARCH SUMMARY");
        self.kv("Topic", &summary.topic);
        self.kv("Query", &summary.query);
        println!("\n  {}\n", summary.summary);

        if !summary.findings.is_empty() {
            self.header(&format!("Key Findings ({})", summary.findings.len()));
            for (i, finding) in summary.findings.iter().enumerate() {
                println!("\n  {}. {}", i + 1, finding.claim);
                self.kv("Evidence", truncate(&finding.evidence, 200));
                self.kv(
                    "Confidence",
                    &format!(
                        "[{}] {:.0}%",
                        confidence_bar(finding.confidence),
                        finding.confidence * 100.0
                    ),
                );
                for citation in finding.citations.iter().take(3) {
                    let kind = serde_json::to_string(&citation.source_type)
                        .unwrap_or_default()
                        .replace('"', "");
                    println!("      * {} ({})", citation.title, kind);
                }
            }
        }

        if !summary.sources.is_empty() {
            self.header(&format!("Sources ({})", summary.sources.len()));
            for source in &summary.sources {
                if source.url.is_empty() {
                    println!("    * {}", source.title);
                } else {
                    println!("    * {} -- {}", source.title, source.url);
                }
            }
        }

        let meta = &summary.metadata;
        self.header("Performance");
        self.kv("Query time", &format!("{:.1}s", meta.query_time_seconds));
        self.kv("Sources found", &meta.sources_found.to_string());
        self.kv("Sources used", &meta.sources_used.to_string());
        self.kv("Tools used", &meta.tools_used.join(", "));
        if meta.retry_count > 0 {
            self.kv("Retries", &meta.retry_count.to_string());
        }
        println!();
    }

    /// Render a failed run with its diagnostics.
    pub fn failure(&self, report: &RunReport) {
        self.error(&format!("Research failed: {}", report.error));
        self.kv("Retries", &report.retry_count.to_string());
        if !report.raw_synthesis.is_empty() {
            self.header("Raw synthesis");
            println!("  {}", truncate(&report.raw_synthesis, RAW_PREVIEW_CHARS));
        }
        println!();
    }

    /// Render the session metrics summary table.
    pub fn metrics_summary(&self, summary: &MetricsSummary) {
        self.header("SESSION METRICS");
        self.kv("Total queries", &summary.total_queries.to_string());
        self.kv("Successful", &summary.successful_queries.to_string());
        self.kv(
            "Parse success rate",
            &format!("{}%", summary.parse_success_rate_pct),
        );
        self.kv(
            "Avg query time",
            &format!("{}s", summary.avg_query_time_seconds),
        );
        self.kv(
            "Avg sources/query",
            &summary.avg_sources_per_query.to_string(),
        );
        self.kv("Total retries", &summary.total_retries.to_string());
        if !summary.tool_usage.is_empty() {
            self.header("Tool usage");
            for (tool, count) in &summary.tool_usage {
                self.kv(tool, &format!("{count} calls"));
            }
        }
        println!();
    }
}

/// Ten-segment confidence bar.
fn confidence_bar(confidence: f64) -> String {
    let filled = (confidence.clamp(0.0, 1.0) * 10.0) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
