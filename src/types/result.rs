//! Records handed back to the caller.

use crate::lora::LoraConfig;
use crate::utils::value::as_count;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of one chat request.
///
/// Stored as an ordered JSON object. OpenAI-compatible and streamed answers
/// hold exactly the canonical keys built from [`Canonical`]. Native answers
/// hold the backend's top-level fields verbatim, so the typed accessors are
/// lenient views and never rewrite what the backend sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedResult(Map<String, Value>);

/// Field values of the canonical result shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Canonical {
    pub content: String,
    pub model: String,
    pub usage: Map<String, Value>,
    pub prompt_tokens: u64,
    pub generation_tokens: u64,
    pub peak_memory: u64,
}

impl From<Canonical> for NormalizedResult {
    /// `output` mirrors `content`.
    fn from(c: Canonical) -> Self {
        let mut map = Map::new();
        map.insert("content".into(), Value::String(c.content.clone()));
        map.insert("output".into(), Value::String(c.content));
        map.insert("model".into(), Value::String(c.model));
        map.insert("usage".into(), Value::Object(c.usage));
        map.insert("prompt_tokens".into(), c.prompt_tokens.into());
        map.insert("generation_tokens".into(), c.generation_tokens.into());
        map.insert("peak_memory".into(), c.peak_memory.into());
        Self(map)
    }
}

impl Default for NormalizedResult {
    fn default() -> Self {
        Canonical::default().into()
    }
}

impl NormalizedResult {
    /// Canonical result carrying only content.
    pub fn from_content(content: impl Into<String>) -> Self {
        Canonical {
            content: content.into(),
            ..Default::default()
        }
        .into()
    }

    /// Backend fields kept as they are.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Raw `content`, which may be structured for schema-constrained answers.
    pub fn content(&self) -> Option<&Value> {
        self.get("content")
    }

    /// `content` as text; structured content is JSON-encoded.
    pub fn text(&self) -> String {
        match self.content() {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn output(&self) -> Option<&Value> {
        self.get("output")
    }

    pub fn model(&self) -> &str {
        self.get("model").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn usage(&self) -> Option<&Map<String, Value>> {
        self.get("usage").and_then(Value::as_object)
    }

    pub fn prompt_tokens(&self) -> u64 {
        self.get("prompt_tokens").and_then(as_count).unwrap_or(0)
    }

    pub fn generation_tokens(&self) -> u64 {
        self.get("generation_tokens").and_then(as_count).unwrap_or(0)
    }

    pub fn peak_memory(&self) -> Option<f64> {
        self.get("peak_memory").and_then(Value::as_f64)
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Result of one LoRA config generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub dataset_id: String,
    pub yaml: String,
    pub config: LoraConfig,
    pub new_adapter_path: String,
    pub resume_adapter: Option<String>,
}

/// Placeholder emitted for a failed batch item under continue-on-failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub error: String,
}

impl ErrorRecord {
    pub fn new(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}
