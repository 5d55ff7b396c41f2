use super::core::CourierClient;
use super::messages::{build_messages, PromptType};
use crate::drivers::{self, InferenceRequest, Provider};
use crate::error::{Error, ErrorContext};
use crate::pipeline;
use crate::structured::schema_from_param;
use crate::transport::RawResponse;
use crate::types::{ModelDescriptor, NormalizedResult};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, Instrument};
use uuid::Uuid;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
pub const DEFAULT_TEMPERATURE: f64 = 0.2;
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;

/// Parameters of one chat request, as read from a job file or built in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatParams {
    pub provider: Provider,
    /// JSON-encoded model descriptor from model listing, or a bare name.
    pub model: String,
    pub prompt_type: PromptType,
    pub system_prompt: String,
    pub prompt: String,
    /// Message list for [`PromptType::Messages`]; an array or a JSON string.
    pub messages: Option<Value>,
    pub temperature: f64,
    /// Loose or strict response schema; a JSON string or a value.
    pub json_schema: Option<Value>,
    pub stream: bool,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: String::new(),
            prompt_type: PromptType::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            prompt: String::new(),
            messages: None,
            temperature: DEFAULT_TEMPERATURE,
            json_schema: None,
            stream: false,
        }
    }
}

impl ChatParams {
    /// Text-mode request for `model` with the default system prompt.
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Request with a ready-made message list.
    pub fn messages(model: impl Into<String>, messages: Value) -> Self {
        Self {
            model: model.into(),
            prompt_type: PromptType::Messages,
            messages: Some(messages),
            ..Default::default()
        }
    }

    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn json_schema(mut self, schema: Value) -> Self {
        self.json_schema = Some(schema);
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    fn validate_temperature(&self) -> Result<()> {
        if TEMPERATURE_RANGE.contains(&self.temperature) {
            Ok(())
        } else {
            Err(Error::invalid_input_with_context(
                "Temperature out of range",
                ErrorContext::new()
                    .with_field_path("temperature")
                    .with_details(format!("{} is not within 0..=2", self.temperature)),
            ))
        }
    }
}

impl CourierClient {
    /// Run one chat request and normalize the answer.
    ///
    /// Streaming requests are read incrementally and accumulated; buffered
    /// JSON answers go through the provider's normalizer. A buffered answer
    /// that is not JSON is treated as an event-stream transcript.
    pub async fn chat(&self, params: &ChatParams) -> Result<NormalizedResult> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "chat",
            %request_id,
            provider = %params.provider,
            stream = params.stream
        );
        self.chat_inner(params).instrument(span).await
    }

    async fn chat_inner(&self, params: &ChatParams) -> Result<NormalizedResult> {
        params.validate_temperature()?;
        let model = resolve_model(&params.model)?;
        let messages = build_messages(
            params.prompt_type,
            &params.system_prompt,
            &params.prompt,
            params.messages.as_ref(),
        )?;
        let schema = schema_from_param(params.json_schema.as_ref());

        let request = drivers::build_request(
            &self.credentials,
            &InferenceRequest {
                provider: params.provider,
                model: &model,
                messages: &messages,
                temperature: params.temperature,
                response_schema: schema.as_ref(),
                stream: params.stream,
            },
        );

        let result = if params.stream {
            info!(url = %request.url, model = %model.name, "opening chat stream");
            let stream = self.transport.send_stream(&request).await?;
            pipeline::parse_byte_stream(stream).await?
        } else {
            match self.send(&request).await? {
                RawResponse::Json(raw) => drivers::normalize_response(params.provider, &raw),
                RawResponse::Text(raw) => pipeline::parse_stream(&raw),
            }
        };
        info!(
            prompt_tokens = result.prompt_tokens(),
            generation_tokens = result.generation_tokens(),
            empty = result.is_empty(),
            "chat completed"
        );
        Ok(result)
    }
}

fn resolve_model(raw: &str) -> Result<ModelDescriptor> {
    ModelDescriptor::resolve(raw)?.into_value().ok_or_else(|| {
        Error::invalid_input_with_context(
            "Model could not be resolved",
            ErrorContext::new().with_field_path("model"),
        )
    })
}
