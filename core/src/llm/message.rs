//! Conversation turn structures

use serde::{Deserialize, Serialize};

/// A single turn in a conversation. The ordered sequence of turns is the
/// model's context window, so insertion order is semantically meaningful.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Role of the turn's author
    pub role: TurnRole,

    /// Text content of the turn. `None` for assistant turns that carry
    /// only tool-call requests.
    pub content: Option<String>,

    /// For tool turns: the id of the tool call this turn answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// For assistant turns: the raw tool-call requests issued by the model
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
}

/// Role of the turn's author
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// System instructions
    System,

    /// Human input
    User,

    /// Model output
    Assistant,

    /// Tool execution result
    Tool,
}

/// A tool invocation requested by the model. The `id` is unique within one
/// model response and must be echoed by the matching tool turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Unique identifier for this call within the response
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Opaque JSON arguments as supplied by the model
    pub arguments: serde_json::Value,
}

impl ConversationTurn {
    /// Create a new system turn
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: TurnRole::System,
            content: Some(content.into()),
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    /// Create a new user turn
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: TurnRole::User,
            content: Some(content.into()),
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    /// Create a new assistant turn, preserving the raw tool-call requests
    pub fn assistant(content: Option<String>, tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content,
            tool_call_id: None,
            tool_calls,
        }
    }

    /// Create a new tool turn answering the given call id
    pub fn tool<S: Into<String>>(tool_call_id: S, content: S) -> Self {
        Self {
            role: TurnRole::Tool,
            content: Some(content.into()),
            tool_call_id: Some(tool_call_id.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Whether this turn carries tool-call requests
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Text content of the turn, if any
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_turn_references_call_id() {
        let turn = ConversationTurn::tool("call_1", "{\"temp\":12}");
        assert_eq!(turn.role, TurnRole::Tool);
        assert_eq!(turn.tool_call_id.as_deref(), Some("call_1"));
        assert!(!turn.has_tool_calls());
    }

    #[test]
    fn assistant_turn_preserves_raw_requests() {
        let turn = ConversationTurn::assistant(
            None,
            vec![ToolCallRequest {
                id: "call_1".to_string(),
                name: "get_weather".to_string(),
                arguments: json!({"location": "Paris"}),
            }],
        );
        assert!(turn.has_tool_calls());
        assert_eq!(turn.tool_calls[0].name, "get_weather");
        assert!(turn.text().is_none());
    }

    #[test]
    fn serialization_skips_empty_fields() {
        let turn = ConversationTurn::user("hello");
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value["role"], "user");
        assert!(value.get("tool_call_id").is_none());
        assert!(value.get("tool_calls").is_none());
    }
}
