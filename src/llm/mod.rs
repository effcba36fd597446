//! LLM provider clients and abstractions.
//!
//! [`LLMClient`] is the seam between the pipeline and whatever model serves
//! it: the filter and synthesis stages hold a `dyn LLMClient` and never see
//! provider details. [`AnthropicClient`] is the shipped backend.

/// Core LLM client trait and message types.
pub mod client;

/// Anthropic Messages API backend.
pub mod anthropic;

pub use anthropic::AnthropicClient;
pub use client::{ChatMessage, ChatRole, LLMClient};
