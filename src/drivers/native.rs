//! Native Courier inference API.
//!
//! - Chat goes to `POST {base}/inference/` with `model_name`/`model_id`/`model_type`.
//! - The Authorization header carries the raw API key, no scheme prefix.
//! - Responses are passed through verbatim; `content` is mirrored to `output`.
//!   Structured content and fractional metrics keep their backend form.

use super::{InferenceRequest, CONTENT_TYPE_JSON};
use crate::structured::ResponseFormat;
use crate::transport::{Credentials, HttpRequest};
use crate::types::{ModelOption, ModelType, NormalizedResult};
use crate::utils::value::{as_text, json_kind};
use serde_json::{json, Value};

pub const INFERENCE_PATH: &str = "/inference/";
pub const MODELS_PATH: &str = "/get-workbench-models/";

pub fn build_request(
    credentials: &Credentials,
    req: &InferenceRequest<'_>,
    response_format: Option<ResponseFormat>,
) -> HttpRequest {
    let mut body = json!({
        "model_name": req.model.name,
        "model_id": req.model.id,
        "model_type": req.model.model_type.as_str(),
        "temperature": req.temperature,
        "messages": req.messages,
        "stream": req.stream,
    });
    if let Some(rf) = response_format {
        body["response_format"] = rf.to_value();
    }

    HttpRequest::post(credentials.endpoint(INFERENCE_PATH), body)
        .with_header(CONTENT_TYPE_JSON.0, CONTENT_TYPE_JSON.1)
        .with_header("Authorization", credentials.api_key())
}

/// Copy every top-level field verbatim; a non-empty `content` is mirrored
/// into `output`.
pub fn normalize_response(raw: &Value) -> NormalizedResult {
    let mut fields = match raw {
        Value::Object(obj) => obj.clone(),
        Value::String(s) => return NormalizedResult::from_content(s.clone()),
        other => {
            tracing::debug!(kind = %json_kind(other), "native response is not an object");
            return NormalizedResult::default();
        }
    };
    if let Some(content) = fields.get("content").filter(|v| is_set(v)).cloned() {
        fields.insert("output".into(), content);
    }
    NormalizedResult::from_map(fields)
}

/// `null`, `false`, zero and `""` count as not set.
fn is_set(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn list_models_request(credentials: &Credentials) -> HttpRequest {
    HttpRequest::get(credentials.endpoint(MODELS_PATH))
        .with_header("Authorization", credentials.api_key())
}

/// `{models: [{name, nickname, model_id, model_type, context_window, api_type}]}`
pub fn shape_models(raw: &Value) -> Vec<ModelOption> {
    let Some(items) = raw.get("models").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| {
            let name = item.get("name").and_then(as_text).unwrap_or_default();
            let nickname = item
                .get("nickname")
                .and_then(as_text)
                .filter(|s| !s.is_empty());
            let context = item
                .get("context_window")
                .and_then(as_text)
                .unwrap_or_default();
            let api_type = item.get("api_type").and_then(as_text).unwrap_or_default();
            let model_type = item
                .get("model_type")
                .and_then(as_text)
                .unwrap_or_else(|| ModelType::TextText.as_str().to_string());

            let value = json!({
                "name": name,
                "id": item.get("model_id").cloned().unwrap_or(Value::Null),
                "type": model_type,
                "api_type": api_type,
            });
            ModelOption {
                name: format!(
                    "{} ({} | {})",
                    nickname.unwrap_or_else(|| name.clone()),
                    context,
                    api_type
                ),
                value: value.to_string(),
            }
        })
        .collect()
}
