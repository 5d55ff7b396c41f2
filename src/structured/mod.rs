//! Structured output support.
//!
//! - [`normalize_schema`]: turn a loose schema description into a strict one
//! - [`ResponseFormat`]: the `response_format` envelope sent to the backend
//!
//! # Examples
//!
//! ```
//! use courier_gateway::structured::normalize_schema;
//! use serde_json::json;
//!
//! let schema = normalize_schema(&json!({"answer": "string"})).unwrap();
//! assert_eq!(schema["required"], json!(["answer", "thought"]));
//! ```

pub mod json_mode;
pub mod schema;

pub use json_mode::{JsonSchemaSpec, ResponseFormat};
pub use schema::{normalize_schema, schema_from_param, schema_from_type_name, SchemaGenerator};
