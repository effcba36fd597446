use anyhow::Context;
use std::io::Write;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vera::cli::output::Output;
use vera::cli::Cli;
use vera::metrics::{MetricsTracker, QueryMetrics};
use vera::research::ResearchPipeline;
use vera::tools::SearchRegistry;
use vera::utils::VeraConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();

    let default_level = if cli.verbose { "vera=debug" } else { "vera=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let out = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let config = VeraConfig::load(&cli.config)?;
    let llm: Arc<dyn vera::llm::LLMClient> = Arc::from(config.llm.build_client()?);
    let registry = Arc::new(SearchRegistry::with_default_providers(&config.search));
    let pipeline =
        ResearchPipeline::new(llm, registry).with_max_retries(config.pipeline.max_retries);
    let mut tracker = MetricsTracker::new(config.metrics.log_file.clone());

    out.banner();

    if let Some(query) = cli.query_text() {
        run_query(&pipeline, &mut tracker, &out, &config, &query, cli.no_save).await;
    } else {
        interactive_loop(&pipeline, &mut tracker, &out, &config, cli.no_save).await?;
    }

    if tracker.query_count() > 0 {
        out.metrics_summary(&tracker.summary());
    }

    Ok(())
}

async fn interactive_loop(
    pipeline: &ResearchPipeline,
    tracker: &mut MetricsTracker,
    out: &Output,
    config: &VeraConfig,
    no_save: bool,
) -> anyhow::Result<()> {
    loop {
        print!("\nEnter your research query (or 'quit' to exit): ");
        std::io::stdout().flush().ok();

        // stdin has no async story worth taking on for a prompt; park the
        // blocking read on the blocking pool instead.
        let (bytes_read, line) = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            let bytes_read = std::io::stdin().read_line(&mut line)?;
            Ok::<_, std::io::Error>((bytes_read, line))
        })
        .await??;

        if bytes_read == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() || matches!(query.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }

        let query = query.to_string();
        run_query(pipeline, tracker, out, config, &query, no_save).await;
    }

    out.info("Goodbye!");
    Ok(())
}

async fn run_query(
    pipeline: &ResearchPipeline,
    tracker: &mut MetricsTracker,
    out: &Output,
    config: &VeraConfig,
    query: &str,
    no_save: bool,
) {
    out.info(&format!("Researching: {query}"));
    out.info("Running search -> filter -> synthesize -> validate...");

    let report = match pipeline.run(query).await {
        Ok(report) => report,
        Err(e) => {
            out.error(&format!("Pipeline error: {e}"));
            return;
        }
    };

    tracker.record(QueryMetrics::from_report(&report));

    match &report.output {
        Some(summary) => {
            out.research_summary(summary);
            if !no_save {
                match save_summary(summary, config) {
                    Ok(path) => out.success(&format!("Output saved to {path}")),
                    Err(e) => out.warning(&format!("Could not save output: {e}")),
                }
            }
        }
        None => out.failure(&report),
    }
}

fn save_summary(
    summary: &vera::types::ResearchSummary,
    config: &VeraConfig,
) -> anyhow::Result<String> {
    let path = &config.metrics.output_file;
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path.display().to_string())
}
