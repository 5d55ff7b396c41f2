//! Conversation assembly from chat parameters.

use crate::error::{Error, ErrorContext};
use crate::types::Message;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the conversation is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptType {
    /// A system prompt plus a single user prompt.
    #[default]
    Text,
    /// A ready-made message list, as a JSON array or a JSON string.
    #[serde(alias = "messagesJson", alias = "messages_json")]
    Messages,
}

/// Build the ordered message list.
///
/// In [`PromptType::Text`] mode a non-empty system prompt comes first and the
/// user prompt is always appended. In [`PromptType::Messages`] mode the list is
/// taken as given; a string is parsed as JSON and a parse failure is
/// [`Error::InvalidInput`]. The list must be a JSON array, but its entries are
/// not inspected: roles and content are the backend's to validate.
pub fn build_messages(
    prompt_type: PromptType,
    system_prompt: &str,
    prompt: &str,
    raw_messages: Option<&Value>,
) -> Result<Vec<Message>> {
    match prompt_type {
        PromptType::Text => {
            let mut messages = Vec::with_capacity(2);
            if !system_prompt.is_empty() {
                messages.push(Message::system(system_prompt));
            }
            messages.push(Message::user(prompt));
            Ok(messages)
        }
        PromptType::Messages => match raw_messages {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(s)) => {
                let parsed: Value = serde_json::from_str(s).map_err(invalid_messages)?;
                turns(parsed)
            }
            Some(v) => turns(v.clone()),
        },
    }
}

fn turns(value: Value) -> Result<Vec<Message>> {
    match value {
        Value::Array(items) => Ok(items.into_iter().map(Message::from_value).collect()),
        other => Err(Error::invalid_input_with_context(
            "Messages must be a JSON array",
            ErrorContext::new()
                .with_field_path("messages")
                .with_details(format!("got {}", crate::utils::value::json_kind(&other))),
        )),
    }
}

fn invalid_messages(e: serde_json::Error) -> Error {
    Error::invalid_input_with_context(
        "Invalid JSON in Messages field",
        ErrorContext::new()
            .with_field_path("messages")
            .with_details(e.to_string()),
    )
}
