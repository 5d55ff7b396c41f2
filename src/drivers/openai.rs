//! OpenAI-compatible chat completions.
//!
//! The backend rejects the raw-key Authorization form, so the header always
//! carries the `Bearer` scheme. Responses are reduced to the canonical shape;
//! nothing from the backend is passed through beyond it.

use super::{InferenceRequest, CONTENT_TYPE_JSON};
use crate::structured::ResponseFormat;
use crate::transport::{Credentials, HttpRequest};
use crate::types::{Canonical, ModelOption, ModelType, NormalizedResult};
use crate::utils::value::as_count;
use serde_json::{json, Value};

pub const CHAT_PATH: &str = "/v1/chat/completions";
pub const MODELS_PATH: &str = "/v1/models";
pub const API_TYPE: &str = "openai";

fn bearer(credentials: &Credentials) -> String {
    format!("Bearer {}", credentials.api_key())
}

pub fn build_request(
    credentials: &Credentials,
    req: &InferenceRequest<'_>,
    response_format: Option<ResponseFormat>,
) -> HttpRequest {
    let mut body = json!({
        "model": req.model.name,
        "messages": req.messages,
        "temperature": req.temperature,
        "stream": req.stream,
    });
    if let Some(rf) = response_format {
        body["response_format"] = rf.to_value();
    }

    HttpRequest::post(credentials.endpoint(CHAT_PATH), body)
        .with_header(CONTENT_TYPE_JSON.0, CONTENT_TYPE_JSON.1)
        .with_header("Authorization", bearer(credentials))
}

pub fn normalize_response(raw: &Value) -> NormalizedResult {
    let content = raw
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let usage = raw
        .get("usage")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    Canonical {
        content: content.to_string(),
        model: raw
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        prompt_tokens: usage.get("prompt_tokens").and_then(as_count).unwrap_or(0),
        generation_tokens: usage
            .get("completion_tokens")
            .and_then(as_count)
            .unwrap_or(0),
        // Not reported by OpenAI-compatible servers.
        peak_memory: 0,
        usage,
    }
    .into()
}

pub fn list_models_request(credentials: &Credentials) -> HttpRequest {
    HttpRequest::get(credentials.endpoint(MODELS_PATH))
        .with_header("Authorization", bearer(credentials))
}

/// `{data: [{id}]}`
pub fn shape_models(raw: &Value) -> Vec<ModelOption> {
    let Some(items) = raw.get("data").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| item.get("id").and_then(Value::as_str))
        .map(|id| ModelOption {
            name: format!("{} (OpenAI)", id),
            value: json!({
                "name": id,
                "id": id,
                "type": ModelType::TextText.as_str(),
                "api_type": API_TYPE,
            })
            .to_string(),
        })
        .collect()
}
