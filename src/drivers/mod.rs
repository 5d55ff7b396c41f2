//! Provider adapters.
//!
//! The two backend dialects share little beyond the HTTP envelope, so they are
//! a closed enum with one module per variant and explicit dispatch here:
//!
//! | Provider | Chat endpoint | Auth header | Response handling |
//! |----------|---------------|-------------|-------------------|
//! | [`Provider::Native`] | `/inference/` | raw key | pass-through + `output` mirror |
//! | [`Provider::OpenAiCompatible`] | `/v1/chat/completions` | `Bearer` key | strict canonical shape |

pub mod native;
pub mod openai;

use crate::structured::ResponseFormat;
use crate::transport::{Credentials, HttpRequest};
use crate::types::{Message, ModelDescriptor, ModelOption, NormalizedResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend API dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Provider {
    #[default]
    #[serde(rename = "courier", alias = "native")]
    Native,
    #[serde(rename = "openai", alias = "openai_compatible")]
    OpenAiCompatible,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Native => "courier",
            Provider::OpenAiCompatible => "openai",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "courier" | "native" | "" => Ok(Provider::Native),
            "openai" | "openai_compatible" | "openai-compatible" => Ok(Provider::OpenAiCompatible),
            other => Err(format!("Unknown API provider: {}", other)),
        }
    }
}

/// Everything that goes into one inference request.
#[derive(Debug, Clone)]
pub struct InferenceRequest<'a> {
    pub provider: Provider,
    pub model: &'a ModelDescriptor,
    pub messages: &'a [Message],
    pub temperature: f64,
    pub response_schema: Option<&'a Value>,
    pub stream: bool,
}

/// Build the complete outbound chat request for the selected provider.
pub fn build_request(credentials: &Credentials, req: &InferenceRequest<'_>) -> HttpRequest {
    let response_format = req
        .response_schema
        .map(|schema| ResponseFormat::json_schema(schema.clone()));
    match req.provider {
        Provider::Native => native::build_request(credentials, req, response_format),
        Provider::OpenAiCompatible => openai::build_request(credentials, req, response_format),
    }
}

/// Normalize a buffered (non-streaming) response body.
pub fn normalize_response(provider: Provider, raw: &Value) -> NormalizedResult {
    match provider {
        Provider::Native => native::normalize_response(raw),
        Provider::OpenAiCompatible => openai::normalize_response(raw),
    }
}

/// Model listing request for the selected provider.
pub fn list_models_request(provider: Provider, credentials: &Credentials) -> HttpRequest {
    match provider {
        Provider::Native => native::list_models_request(credentials),
        Provider::OpenAiCompatible => openai::list_models_request(credentials),
    }
}

/// Shape an already fetched model listing into selectable options.
pub fn shape_models(provider: Provider, raw: &Value) -> Vec<ModelOption> {
    match provider {
        Provider::Native => native::shape_models(raw),
        Provider::OpenAiCompatible => openai::shape_models(raw),
    }
}

pub(crate) const CONTENT_TYPE_JSON: (&str, &str) = ("Content-Type", "application/json");
