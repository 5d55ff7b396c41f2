//! Model listing, model management and credential check.

use super::core::CourierClient;
use crate::drivers::{self, Provider, CONTENT_TYPE_JSON};
use crate::transport::{HttpRequest, RawResponse};
use crate::types::ModelOption;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, Instrument};
use uuid::Uuid;

pub const LOAD_PATH: &str = "/model/load";
pub const UNLOAD_PATH: &str = "/model/unload";
pub const CHECK_PATH: &str = "/check-validity-status/";

/// Weight quantization used when loading a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quantization {
    Q4_0,
    #[default]
    Q4KM,
    Q5KM,
    Q8_0,
    F16,
}

impl Quantization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quantization::Q4_0 => "q4_0",
            Quantization::Q4KM => "q4_k_m",
            Quantization::Q5KM => "q5_k_m",
            Quantization::Q8_0 => "q8_0",
            Quantization::F16 => "f16",
        }
    }
}

impl std::str::FromStr for Quantization {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "q4_0" => Ok(Quantization::Q4_0),
            "q4_k_m" => Ok(Quantization::Q4KM),
            "q5_k_m" => Ok(Quantization::Q5KM),
            "q8_0" => Ok(Quantization::Q8_0),
            "f16" => Ok(Quantization::F16),
            other => Err(format!("Unknown quantization: {}", other)),
        }
    }
}

impl Serialize for Quantization {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Quantization {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Load or unload a model on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ManageAction {
    Load {
        model_id: String,
        #[serde(default)]
        quantization: Quantization,
    },
    Unload {
        model_id: String,
    },
}

impl ManageAction {
    fn path(&self) -> &'static str {
        match self {
            ManageAction::Load { .. } => LOAD_PATH,
            ManageAction::Unload { .. } => UNLOAD_PATH,
        }
    }

    fn body(&self) -> Value {
        match self {
            ManageAction::Load {
                model_id,
                quantization,
            } => json!({"model_id": model_id, "quantization": quantization.as_str()}),
            ManageAction::Unload { model_id } => json!({"model_id": model_id}),
        }
    }
}

impl CourierClient {
    /// Fetch the model list and shape it into selectable options.
    pub async fn list_models(&self, provider: Provider) -> Result<Vec<ModelOption>> {
        let span = tracing::info_span!("list_models", request_id = %Uuid::new_v4(), %provider);
        async move {
            let request = drivers::list_models_request(provider, &self.credentials);
            let options = match self.send(&request).await? {
                RawResponse::Json(raw) => drivers::shape_models(provider, &raw),
                RawResponse::Text(_) => {
                    debug!("model listing is not JSON");
                    Vec::new()
                }
            };
            debug!(count = options.len(), "models listed");
            Ok(options)
        }
        .instrument(span)
        .await
    }

    /// Load or unload a model; returns the backend's answer as is.
    pub async fn manage_model(&self, action: &ManageAction) -> Result<Value> {
        let span = tracing::info_span!("manage_model", request_id = %Uuid::new_v4());
        let request = HttpRequest::post(self.credentials.endpoint(action.path()), action.body())
            .with_header(CONTENT_TYPE_JSON.0, CONTENT_TYPE_JSON.1)
            .with_header("Authorization", self.credentials.api_key());
        self.send_json(&request).instrument(span).await
    }

    /// Ask the backend whether the configured API key is valid.
    pub async fn check_credentials(&self) -> Result<Value> {
        let span = tracing::info_span!("check_credentials", request_id = %Uuid::new_v4());
        let request = HttpRequest::get(self.credentials.endpoint(CHECK_PATH))
            .with_header("Authorization", self.credentials.api_key());
        self.send_json(&request).instrument(span).await
    }
}
