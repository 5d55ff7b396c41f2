//! Response schema normalization.
//!
//! Callers describe structured output loosely, usually as a flat
//! `{"field": "type"}` map. The backend wants a strict object schema with
//! every field required and a rationale field reserved.

use serde_json::{json, Map, Value};

/// Property names that count as a rationale field.
pub const RATIONALE_FIELDS: [&str; 2] = ["thought", "reasoning"];

const KNOWN_TYPES: [&str; 6] = ["string", "number", "integer", "boolean", "array", "object"];

/// Builder for strict object schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaGenerator {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl SchemaGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_property(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    pub fn require(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn build(self) -> Value {
        json!({
            "type": "object",
            "properties": self.properties,
            "required": self.required,
        })
    }
}

/// Schema for a simple type name. Unknown names map to `string`.
pub fn schema_from_type_name(type_name: &str) -> Value {
    if KNOWN_TYPES.contains(&type_name) {
        json!({ "type": type_name })
    } else {
        json!({ "type": "string" })
    }
}

/// Normalize a loose schema description into a strict object schema.
///
/// Returns `None` when there is nothing to constrain: absent, non-object or
/// empty input. A schema that already has `type: "object"` and `properties`
/// is returned unchanged, as is the inner schema of a full
/// `{"type": "json_schema", "json_schema": {"schema": ...}}` response format.
pub fn normalize_schema(raw: &Value) -> Option<Value> {
    let obj = raw.as_object()?;
    if obj.is_empty() {
        return None;
    }

    if is_strict(obj) {
        return Some(raw.clone());
    }

    if obj.get("type").and_then(Value::as_str) == Some("json_schema") {
        let inner = raw.pointer("/json_schema/schema")?;
        return normalize_schema(inner);
    }

    let mut generator = SchemaGenerator::new();
    for (key, value) in obj {
        match value {
            Value::String(type_name) => {
                generator = generator
                    .add_property(key.as_str(), schema_from_type_name(type_name))
                    .require(key.as_str());
            }
            Value::Object(spec) => {
                let optional = spec.get("required") == Some(&Value::Bool(false));
                generator = generator.add_property(key.as_str(), value.clone());
                if !optional {
                    generator = generator.require(key.as_str());
                }
            }
            // Numbers, booleans, arrays and nulls do not describe a field.
            _ => {}
        }
    }

    if !RATIONALE_FIELDS.iter().any(|f| generator.has_property(f)) {
        generator = generator
            .add_property("thought", json!({ "type": "string" }))
            .require("thought");
    }

    Some(generator.build())
}

/// Normalize the schema parameter as the caller supplied it.
///
/// Accepts either a JSON string or an already parsed value. Blank strings and
/// `{}` mean "no constraint"; an unparsable string is ignored.
pub fn schema_from_param(raw: Option<&Value>) -> Option<Value> {
    match raw? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == "{}" {
                return None;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(parsed) => normalize_schema(&parsed),
                Err(e) => {
                    tracing::debug!(error = %e, "ignoring unparsable response schema");
                    None
                }
            }
        }
        other => normalize_schema(other),
    }
}

fn is_strict(obj: &Map<String, Value>) -> bool {
    obj.get("type").and_then(Value::as_str) == Some("object") && obj.contains_key("properties")
}
