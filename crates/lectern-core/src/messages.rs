//! Conversation messages exchanged with the completion endpoint.
//!
//! [`ChatMessage`] is the canonical in-memory form; provider clients own the
//! conversion to their wire format.

use serde::{Deserialize, Serialize};

/// One message in a conversation, tagged by role.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    /// System prompt.
    System {
        /// Prompt text.
        content: String,
    },
    /// End-user question.
    User {
        /// Question text.
        content: String,
    },
    /// Model output: free text, tool calls, or both.
    Assistant {
        /// Plain content, if any.
        content: Option<String>,
        /// Tool calls requested this turn.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCallRequest>,
    },
    /// Result of one dispatched tool call.
    Tool {
        /// Id of the tool call this result answers.
        tool_call_id: String,
        /// Name of the invoked tool.
        name: String,
        /// Rendered result (or `Error: ...` text).
        content: String,
    },
}

impl ChatMessage {
    /// System message constructor.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// User message constructor.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Tool-result message constructor.
    pub fn tool(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::Tool {
            tool_call_id: tool_call_id.into(),
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A tool invocation requested by the model.
///
/// `arguments` is kept as the raw JSON string the endpoint produced; decoding
/// into typed arguments happens at dispatch so a malformed payload becomes a
/// recoverable per-call error instead of a failed completion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Endpoint-assigned call id, echoed back in the tool result.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Raw JSON-encoded argument object.
    pub arguments: String,
}

/// The terminal answer of an agent run.
///
/// Created only by the model invoking the designated termination tool; once
/// set it is immutable and ends the run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalAnswer {
    /// Free-text answer.
    pub answer: String,
    /// Entry ids cited as evidence.
    pub source_entry_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_tagging() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hi");
    }

    #[test]
    fn assistant_without_tool_calls_omits_field() {
        let json = serde_json::to_value(ChatMessage::Assistant {
            content: Some("done".into()),
            tool_calls: vec![],
        })
        .unwrap();
        assert!(json.get("tool_calls").is_none());
    }

    #[test]
    fn tool_message_carries_call_id() {
        let msg = ChatMessage::tool("tc_1", "read_entry", "{}");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "tc_1");
        assert_eq!(json["name"], "read_entry");
    }

    #[test]
    fn final_answer_roundtrip() {
        let fa = FinalAnswer {
            answer: "42".into(),
            source_entry_ids: vec![1, 3],
        };
        let back: FinalAnswer =
            serde_json::from_str(&serde_json::to_string(&fa).unwrap()).unwrap();
        assert_eq!(back, fa);
    }
}
