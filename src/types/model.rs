//! Model identity as selected by the caller.

use crate::error::ErrorContext;
use crate::utils::recover::{parse_or_recover, Recovery};
use crate::utils::value::as_text;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Display name used when the caller passes a bare opaque id.
pub const UNKNOWN_MODEL_NAME: &str = "Unknown Model";

/// Length of a hyphenated opaque model id (UUID form).
const OPAQUE_ID_LEN: usize = 36;

/// Modality of a model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModelType {
    #[default]
    TextText,
    ImageTextText,
    Other(String),
}

impl ModelType {
    pub fn as_str(&self) -> &str {
        match self {
            ModelType::TextText => "text-text",
            ModelType::ImageTextText => "image-text-text",
            ModelType::Other(s) => s,
        }
    }

    /// Map the free-form type hint of a `name | context | type` string.
    fn from_hint(hint: &str) -> Self {
        if hint.trim().eq_ignore_ascii_case("image") {
            ModelType::ImageTextText
        } else {
            ModelType::TextText
        }
    }
}

impl From<String> for ModelType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "text-text" => ModelType::TextText,
            "image-text-text" => ModelType::ImageTextText,
            _ => ModelType::Other(s),
        }
    }
}

impl From<ModelType> for String {
    fn from(t: ModelType) -> Self {
        t.as_str().to_string()
    }
}

/// Opaque model identity consumed by the request adapters.
///
/// Deserializes from any JSON value: fields are read leniently, so a `null`
/// or missing `type` is `text-text` and a numeric id becomes text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ModelDescriptor {
    pub name: String,
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_type: Option<String>,
}

impl From<Value> for ModelDescriptor {
    fn from(v: Value) -> Self {
        let text = |key: &str| v.get(key).and_then(as_text);
        Self {
            name: text("name").unwrap_or_default(),
            id: text("id"),
            model_type: v
                .get("type")
                .and_then(Value::as_str)
                .map(|t| ModelType::from(t.to_string()))
                .unwrap_or_default(),
            api_type: text("api_type"),
        }
    }
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            model_type: ModelType::TextText,
            api_type: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_type(mut self, model_type: ModelType) -> Self {
        self.model_type = model_type;
        self
    }

    pub fn with_api_type(mut self, api_type: impl Into<String>) -> Self {
        self.api_type = Some(api_type.into());
        self
    }

    /// Resolve the caller's model parameter.
    ///
    /// The parameter is normally the JSON produced by model listing; any valid
    /// JSON is read as a descriptor. Text that is not JSON is recovered
    /// heuristically, in order:
    /// 1. a 36 character string containing `-` is an opaque id,
    /// 2. `name | context | type` splits into a name and a type hint,
    /// 3. otherwise the whole string is the display name.
    ///
    /// Fails with [`Error::InvalidInput`] if the resolved name is blank.
    pub fn resolve(raw: &str) -> Result<Recovery<ModelDescriptor>> {
        let resolved = parse_or_recover(raw, |raw, _| Some(Self::recover(raw)));
        let blank = resolved
            .value()
            .map(|m| m.name.trim().is_empty())
            .unwrap_or(true);
        if blank {
            return Err(Error::invalid_input_with_context(
                "Model name is required",
                ErrorContext::new()
                    .with_field_path("model")
                    .with_source("model_resolver"),
            ));
        }
        if resolved.is_recovered() {
            tracing::debug!(raw, "model parameter is not JSON, recovered heuristically");
        }
        Ok(resolved)
    }

    fn recover(raw: &str) -> ModelDescriptor {
        if raw.chars().count() == OPAQUE_ID_LEN && raw.contains('-') {
            return ModelDescriptor::new(UNKNOWN_MODEL_NAME).with_id(raw);
        }
        if raw.contains('|') {
            let parts: Vec<&str> = raw.split('|').collect();
            let model_type = parts
                .get(2)
                .map(|hint| ModelType::from_hint(hint))
                .unwrap_or_default();
            return ModelDescriptor::new(parts[0].trim()).with_type(model_type);
        }
        ModelDescriptor::new(raw)
    }
}

/// One selectable entry produced by model listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOption {
    /// Human readable label.
    pub name: String,
    /// JSON-encoded [`ModelDescriptor`], accepted back by [`ModelDescriptor::resolve`].
    pub value: String,
}
