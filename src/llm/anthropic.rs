//! Anthropic Claude LLM client.
//!
//! A thin `reqwest` client for the Anthropic Messages API. Model id,
//! temperature, and token limits come from configuration; the base URL is
//! injectable so tests can point the client at a mock server.

use crate::llm::client::{ChatMessage, ChatRole, LLMClient};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude client for API-based inference.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl AnthropicClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Anthropic API key
    /// * `model` - Model identifier (e.g., "claude-3-5-sonnet-20241022")
    /// * `temperature` - Sampling temperature
    /// * `max_tokens` - Completion token ceiling
    pub fn new(api_key: String, model: String, temperature: f32, max_tokens: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_base: DEFAULT_API_BASE.to_string(),
            model,
            temperature,
            max_tokens,
        }
    }

    /// Override the API base URL. Used by tests against a mock server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Split conversation messages into Claude's separate system prompt and
    /// user/assistant turns. The last system message wins.
    fn partition_messages<'a>(
        messages: &'a [ChatMessage],
    ) -> (Option<&'a str>, Vec<ApiMessage<'a>>) {
        let mut system = None;
        let mut turns = Vec::with_capacity(messages.len());
        for message in messages {
            match message.role {
                ChatRole::System => system = Some(message.content.as_str()),
                ChatRole::User => turns.push(ApiMessage {
                    role: "user",
                    content: &message.content,
                }),
                ChatRole::Assistant => turns.push(ApiMessage {
                    role: "assistant",
                    content: &message.content,
                }),
            }
        }
        (system, turns)
    }

    fn extract_text(response: &MessagesResponse) -> String {
        response
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[async_trait]
impl LLMClient for AnthropicClient {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String> {
        let (system, turns) = Self::partition_messages(messages);
        if turns.is_empty() {
            return Err(AppError::LLM(
                "conversation contains no user or assistant messages".to_string(),
            ));
        }

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system,
            messages: turns,
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.api_base))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("Anthropic API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::LLM(format!(
                "Anthropic API returned {status}: {body}"
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Anthropic API response malformed: {e}")))?;

        Ok(Self::extract_text(&parsed))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = AnthropicClient::new(
            "test-key".to_string(),
            "claude-3-5-sonnet-20241022".to_string(),
            0.2,
            4096,
        );
        assert_eq!(client.model_name(), "claude-3-5-sonnet-20241022");
        assert_eq!(client.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_api_base_override() {
        let client = AnthropicClient::new("k".to_string(), "m".to_string(), 0.0, 16)
            .with_api_base("http://127.0.0.1:9999");
        assert_eq!(client.api_base, "http://127.0.0.1:9999");
    }

    #[test]
    fn test_partition_pulls_out_system_prompt() {
        let messages = [
            ChatMessage::system("be terse"),
            ChatMessage::user("hello"),
            ChatMessage::assistant("hi"),
            ChatMessage::user("again"),
        ];
        let (system, turns) = AnthropicClient::partition_messages(&messages);
        assert_eq!(system, Some("be terse"));
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].role, "user");
        assert_eq!(turns[1].role, "assistant");
    }

    #[test]
    fn test_extract_text_skips_non_text_blocks() {
        let response = MessagesResponse {
            content: vec![
                ContentBlock {
                    kind: "thinking".to_string(),
                    text: "ignored".to_string(),
                },
                ContentBlock {
                    kind: "text".to_string(),
                    text: "kept".to_string(),
                },
            ],
        };
        assert_eq!(AnthropicClient::extract_text(&response), "kept");
    }
}
