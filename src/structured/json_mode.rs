//! `response_format` envelope shared by both providers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{"type": "json_schema", "json_schema": {"schema": ...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    pub json_schema: JsonSchemaSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaSpec {
    pub schema: Value,
}

impl ResponseFormat {
    pub fn json_schema(schema: Value) -> Self {
        Self {
            format_type: "json_schema".to_string(),
            json_schema: JsonSchemaSpec { schema },
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "type": self.format_type,
            "json_schema": { "schema": self.json_schema.schema },
        })
    }
}
