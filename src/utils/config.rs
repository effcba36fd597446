//! TOML-based configuration (`vera.toml`).
//!
//! Every section and field has a default, so a missing file or an empty one
//! yields a fully working configuration. Secrets are never stored in the
//! file; the config names the environment variable that holds them.

use crate::llm::{AnthropicClient, LLMClient};
use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure loaded from `vera.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VeraConfig {
    /// Language model settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Search provider settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Pipeline behavior settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Metrics sink settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

// ============= LLM Configuration =============

/// Language model provider and sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name. Currently `"anthropic"`.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion token ceiling.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_provider() -> String {
    "anthropic".to_string()
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl LlmConfig {
    /// Build the configured LLM client, reading the API key from the
    /// environment variable this config names.
    pub fn build_client(&self) -> Result<Box<dyn LLMClient>> {
        match self.provider.as_str() {
            "anthropic" => {
                let api_key = std::env::var(&self.api_key_env).map_err(|_| {
                    AppError::Config(format!(
                        "environment variable {} is not set",
                        self.api_key_env
                    ))
                })?;
                Ok(Box::new(AnthropicClient::new(
                    api_key,
                    self.model.clone(),
                    self.temperature,
                    self.max_tokens,
                )))
            }
            other => Err(AppError::Config(format!(
                "unknown LLM provider '{other}' (supported: anthropic)"
            ))),
        }
    }
}

// ============= Search Configuration =============

/// Search provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Results requested from each index-backed provider.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Article cap for Wikipedia specifically.
    #[serde(default = "default_wikipedia_results")]
    pub wikipedia_results: usize,

    /// User-Agent header sent with provider HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_max_results() -> usize {
    5
}

fn default_wikipedia_results() -> usize {
    3
}

fn default_user_agent() -> String {
    format!("vera-research/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            wikipedia_results: default_wikipedia_results(),
            user_agent: default_user_agent(),
        }
    }
}

// ============= Pipeline Configuration =============

/// Pipeline behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Synthesis retries permitted after the first validation failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_max_retries() -> u32 {
    crate::research::MAX_VALIDATION_RETRIES
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
        }
    }
}

// ============= Metrics Configuration =============

/// Metrics sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// JSONL file receiving one record per query.
    #[serde(default = "default_metrics_file")]
    pub log_file: PathBuf,

    /// Path where a successful run's summary JSON is written.
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
}

fn default_metrics_file() -> PathBuf {
    PathBuf::from("metrics_log.jsonl")
}

fn default_output_file() -> PathBuf {
    PathBuf::from("research_output.json")
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            log_file: default_metrics_file(),
            output_file: default_output_file(),
        }
    }
}

impl VeraConfig {
    /// Load configuration from a TOML file. A missing file is not an error:
    /// defaults apply, matching a fresh checkout with no `vera.toml` yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file found, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| {
            AppError::Config(format!("failed to parse {}: {e}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: VeraConfig = toml::from_str("").unwrap();
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.temperature, 0.2);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.search.wikipedia_results, 3);
        assert_eq!(config.pipeline.max_retries, 2);
        assert_eq!(config.metrics.log_file, PathBuf::from("metrics_log.jsonl"));
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: VeraConfig = toml::from_str(
            r#"
            [llm]
            model = "claude-3-5-haiku-20241022"

            [pipeline]
            max_retries = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.model, "claude-3-5-haiku-20241022");
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.pipeline.max_retries, 4);
        assert_eq!(config.search.max_results, 5);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let llm = LlmConfig {
            provider: "carrier-pigeon".to_string(),
            ..LlmConfig::default()
        };
        assert!(llm.build_client().is_err());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let config = VeraConfig::load(Path::new("/nonexistent/vera.toml")).unwrap();
        assert_eq!(config.search.max_results, 5);
    }
}
