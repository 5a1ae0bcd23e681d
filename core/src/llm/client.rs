//! Model completion client trait and reply structures

use crate::error::Result;
use crate::llm::{ConversationTurn, ToolCallRequest};
use crate::tools::ToolDescriptor;
use async_trait::async_trait;

/// Trait for model completion clients. From the engine's perspective a
/// completion is a pure, possibly-nondeterministic function of the turn
/// history and the advertised tool catalog.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Request one completion for the given history and tool catalog
    async fn complete(
        &self,
        history: &[ConversationTurn],
        tools: &[ToolDescriptor],
    ) -> Result<ModelReply>;

    /// Get the model name
    fn model_name(&self) -> &str;

    /// Get the provider name
    fn provider_name(&self) -> &str;
}

/// One model response: plain text, tool-call requests, or both
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    /// Text content of the reply, if any
    pub content: Option<String>,

    /// Tool-call requests, in the order the model issued them
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ModelReply {
    /// A reply that terminates the run with plain text
    pub fn text<S: Into<String>>(content: S) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A reply that requests tool calls
    pub fn tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self {
            content: None,
            tool_calls: calls,
        }
    }

    /// Whether the reply requests any tool calls
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
