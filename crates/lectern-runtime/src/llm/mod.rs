//! Completion endpoint abstraction.
//!
//! The agent loop talks to [`CompletionClient`]; the OpenAI-compatible HTTP
//! implementation lives in [`openai`], and tests substitute scripted fakes.

pub mod openai;

use async_trait::async_trait;
use lectern_core::messages::{ChatMessage, ToolCallRequest};
use lectern_core::tools::ToolDefinition;

use crate::errors::LlmError;

/// One completion from the endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompletionOutput {
    /// Assistant text content, if any.
    pub content: Option<String>,
    /// Tool calls requested this turn, in endpoint order.
    pub tool_calls: Vec<ToolCallRequest>,
}

/// A chat-completion endpoint capable of tool calling.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Request one completion for the conversation so far.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<CompletionOutput, LlmError>;
}
