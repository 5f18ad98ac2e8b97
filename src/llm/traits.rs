//! Model provider seam for the browser agent
//!
//! The agent needs one thing from a model: given the conversation and the
//! browser tools, return either tool calls or a final text. Any
//! OpenAI-compatible endpoint, or a scripted fake in tests, can stand behind it.

use async_trait::async_trait;

use crate::core::{Message, Result, ToolCall, ToolDefinition};

/// One model turn
#[derive(Debug, Clone, Default)]
pub struct LLMResponse {
    /// Text the model produced; the final answer when there are no tool calls
    pub content: String,
    /// Browser tools the model asked to run, in order
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<TokenUsage>,
    /// Model that actually served the request
    pub model: String,
}

impl LLMResponse {
    /// Whether the model wants the agent to act rather than answer
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Token accounting reported by the endpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Sampling options for a single request
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl GenerateOptions {
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            ..Self::default()
        }
    }
}

/// A chat model that can call tools
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Request one turn; an empty `tools` slice means plain completion
    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse>;

    /// Request one turn without offering any tools
    async fn chat(
        &self,
        model: &str,
        messages: &[Message],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.chat_with_tools(model, messages, &[], options).await
    }

    /// Short provider label for logs
    fn name(&self) -> &str;
}
