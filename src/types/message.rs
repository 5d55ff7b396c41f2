//! Conversation turns as sent to the backend.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One turn of a conversation.
///
/// Turns built here are `{role, content}` objects. Turns supplied by the
/// caller as JSON are carried exactly as given, whatever their shape: tool
/// call turns without `content`, unknown roles and extra keys all reach the
/// backend untouched, and the backend is the one that validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(Value);

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self::with_text(MessageRole::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::with_text(MessageRole::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_text(MessageRole::Assistant, text)
    }

    pub fn with_text(role: MessageRole, text: impl Into<String>) -> Self {
        Self(json!({"role": role.as_str(), "content": text.into()}))
    }

    /// Wrap a caller-supplied turn without inspecting it.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Role, when the turn carries a string `role`.
    pub fn role(&self) -> Option<MessageRole> {
        self.0.get("role").and_then(Value::as_str).map(MessageRole::from)
    }

    pub fn content(&self) -> Option<&Value> {
        self.0.get("content")
    }

    /// Plain text of the message, if its content is a string.
    pub fn text(&self) -> Option<&str> {
        self.content().and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Message role
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Other(String),
}

impl MessageRole {
    pub fn as_str(&self) -> &str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Other(s) => s,
        }
    }
}

impl From<&str> for MessageRole {
    fn from(s: &str) -> Self {
        match s {
            "system" => MessageRole::System,
            "user" => MessageRole::User,
            "assistant" => MessageRole::Assistant,
            _ => MessageRole::Other(s.to_string()),
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
