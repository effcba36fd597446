//! CLI for V.E.R.A.
//!
//! Argument parsing with clap and colored terminal output via owo-colors.

/// Colored terminal output helpers.
pub mod output;

use clap::Parser;
use std::path::PathBuf;

/// V.E.R.A - Validated Evidence Research Assistant
///
/// Runs research queries through a four-stage pipeline
/// (search -> filter -> synthesize -> validate) with schema-validated
/// structured output and per-query metrics.
#[derive(Parser, Debug)]
#[command(
    name = "vera",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "V.E.R.A - Validated Evidence Research Assistant",
    long_about = "Runs research queries through a four-stage pipeline\n\
                  (search -> filter -> synthesize -> validate), aggregating\n\
                  web, encyclopedia, and academic paper sources into a\n\
                  schema-validated structured summary.",
    after_help = "EXAMPLES:\n    \
                  vera                                # Interactive research loop\n    \
                  vera \"quantum error correction\"     # One-shot query\n    \
                  vera --config my.toml --no-save \"rust async runtimes\""
)]
pub struct Cli {
    /// Research query. Omit to start the interactive loop.
    #[arg(trailing_var_arg = true)]
    pub query: Vec<String>,

    /// Path to the configuration file
    #[arg(short, long, default_value = "vera.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Do not write successful summaries to the output JSON file
    #[arg(long, global = true)]
    pub no_save: bool,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The query joined into one string, if one was given.
    pub fn query_text(&self) -> Option<String> {
        if self.query.is_empty() {
            None
        } else {
            Some(self.query.join(" "))
        }
    }
}
