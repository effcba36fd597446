//! LLM client abstraction.
//!
//! The pipeline only needs an opaque "messages in, text out" seam; this
//! trait is that seam. The shipped implementation is the Anthropic Messages
//! API client in [`crate::llm::anthropic`], but tests (and alternative
//! backends) implement the same trait.

use crate::types::Result;
use async_trait::async_trait;

/// Role of a single chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System instruction.
    System,
    /// End-user input.
    User,
    /// Prior model output.
    Assistant,
}

/// One role-tagged message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Who authored the message.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// A system instruction message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// An assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Generic LLM client trait for provider abstraction.
///
/// All model backends implement this trait, allowing the pipeline to swap
/// providers without changing application code.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from an ordered list of role-tagged messages.
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Generate a completion from a bare prompt.
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.invoke(&[ChatMessage::user(prompt)]).await
    }

    /// Generate with a system instruction and a user prompt.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.invoke(&[ChatMessage::system(system), ChatMessage::user(prompt)])
            .await
    }

    /// The model name/identifier this client talks to.
    fn model_name(&self) -> &str;
}
