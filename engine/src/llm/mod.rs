//! LLM Provider Abstraction Layer
//!
//! This module provides the conversation message model and the common
//! interface for reasoning providers. The `LLMProvider` trait is one
//! reasoning step: given the system instruction, the current message log and
//! the tool catalog, the provider answers with text and zero or more tool calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod openai;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Kind of a message, used where only the variant tag matters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    User,
    Assistant,
    ToolResult,
    System,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::User => write!(f, "user"),
            MessageKind::Assistant => write!(f, "assistant"),
            MessageKind::ToolResult => write!(f, "tool"),
            MessageKind::System => write!(f, "system"),
        }
    }
}

/// Tool call request from the LLM
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,

    /// Name of the tool to call
    pub name: String,

    /// Arguments to pass to the tool (JSON string)
    pub arguments: String,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserMessage {
    pub id: String,
    pub seq: u64,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssistantMessage {
    pub id: String,
    pub seq: u64,

    /// Visible text. May be empty when the message only carries tool calls.
    pub content: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolResultMessage {
    pub id: String,
    pub seq: u64,

    /// Id of the `ToolCall` this message answers
    pub tool_call_id: String,

    /// Name of the tool that produced the result
    pub name: String,

    /// JSON payload returned by the tool
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemMessage {
    pub id: String,
    pub seq: u64,
    pub content: String,
}

/// Message in a conversation history
///
/// `seq` is the ordinal position in the owning session's log. It is 0 until
/// the session records the message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    User(UserMessage),
    Assistant(AssistantMessage),
    ToolResult(ToolResultMessage),
    System(SystemMessage),
}

fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Message::User(UserMessage {
            id: new_message_id(),
            seq: 0,
            content: content.into(),
        })
    }

    /// Create a new assistant message without tool calls
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::assistant_with_tools(content, Vec::new())
    }

    /// Create a new assistant message that requests tool calls
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Assistant(AssistantMessage {
            id: new_message_id(),
            seq: 0,
            content: content.into(),
            tool_calls,
        })
    }

    /// Create a new tool result message
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Message::ToolResult(ToolResultMessage {
            id: new_message_id(),
            seq: 0,
            tool_call_id: tool_call_id.into(),
            name: name.into(),
            content: content.into(),
        })
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Message::System(SystemMessage {
            id: new_message_id(),
            seq: 0,
            content: content.into(),
        })
    }

    pub fn id(&self) -> &str {
        match self {
            Message::User(m) => &m.id,
            Message::Assistant(m) => &m.id,
            Message::ToolResult(m) => &m.id,
            Message::System(m) => &m.id,
        }
    }

    pub fn seq(&self) -> u64 {
        match self {
            Message::User(m) => m.seq,
            Message::Assistant(m) => m.seq,
            Message::ToolResult(m) => m.seq,
            Message::System(m) => m.seq,
        }
    }

    pub(crate) fn set_seq(&mut self, seq: u64) {
        match self {
            Message::User(m) => m.seq = seq,
            Message::Assistant(m) => m.seq = seq,
            Message::ToolResult(m) => m.seq = seq,
            Message::System(m) => m.seq = seq,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::User(_) => MessageKind::User,
            Message::Assistant(_) => MessageKind::Assistant,
            Message::ToolResult(_) => MessageKind::ToolResult,
            Message::System(_) => MessageKind::System,
        }
    }

    /// Tool that produced a tool result message
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            Message::ToolResult(m) => Some(&m.name),
            _ => None,
        }
    }

    /// Text payload of the message
    pub fn content(&self) -> &str {
        match self {
            Message::User(m) => &m.content,
            Message::Assistant(m) => &m.content,
            Message::ToolResult(m) => &m.content,
            Message::System(m) => &m.content,
        }
    }
}

/// Definition of a tool advertised to the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,

    /// JSON schema of the arguments object
    pub parameters: serde_json::Value,
}

/// Response from an LLM provider for one reasoning step
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LLMResponse {
    /// Visible text, possibly empty
    pub content: String,

    /// Requested tool calls. Empty means the turn is finished.
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl LLMResponse {
    /// A response that ends the turn with text
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// A response that requests tools, optionally with text
    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Convert into the assistant message recorded in the log
    pub fn into_message(self) -> Message {
        Message::assistant_with_tools(self.content, self.tool_calls)
    }
}

/// LLM Provider trait that all providers must implement
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Returns the name of the provider (e.g., "openrouter")
    fn name(&self) -> &str;

    /// Generate one reasoning step
    ///
    /// # Arguments
    /// * `system` - System instruction for this turn
    /// * `messages` - Conversation log including tool results
    /// * `tools` - Tool catalog the provider may call
    async fn generate(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let user_msg = Message::user("Hello");
        assert_eq!(user_msg.kind(), MessageKind::User);
        assert_eq!(user_msg.content(), "Hello");
        assert_eq!(user_msg.seq(), 0);

        let assistant_msg = Message::assistant("Hi there");
        assert_eq!(assistant_msg.kind(), MessageKind::Assistant);

        let tool_msg = Message::tool_result("call_123", "list_spaces", "{}");
        assert_eq!(tool_msg.kind(), MessageKind::ToolResult);
        match tool_msg {
            Message::ToolResult(ref m) => assert_eq!(m.tool_call_id, "call_123"),
            _ => panic!("expected a tool result"),
        }
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::user("same");
        let b = Message::user("same");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_message_serialization_is_tagged() {
        let msg = Message::assistant_with_tools(
            "",
            vec![ToolCall::new("c1", "list_spaces", "{}")],
        );
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["tool_calls"][0]["name"], "list_spaces");

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_response_into_message() {
        let response = LLMResponse::with_tool_calls(
            "Checking",
            vec![ToolCall::new("c1", "search_tasks", r#"{"query":"milk"}"#)],
        );
        assert!(response.has_tool_calls());

        match response.into_message() {
            Message::Assistant(m) => {
                assert_eq!(m.content, "Checking");
                assert_eq!(m.tool_calls.len(), 1);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
