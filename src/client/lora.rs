use super::core::CourierClient;
use crate::lora::{self, LoraOverrides, RemoteFetch, RemotePolicy};
use crate::transport::{HttpRequest, RawResponse};
use crate::types::ConfigRecord;
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, Instrument};
use uuid::Uuid;

pub const DEFAULT_ADAPTER_PATH: &str = "/path/to/new/adapter";

/// One LoRA config generation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoraJob {
    pub dataset_id: String,
    pub fetch_remote_config: bool,
    pub fail_if_no_remote: bool,
    /// Where the new adapter is written; becomes `adapter_path`.
    pub new_adapter_path: String,
    /// Directory of an adapter to resume from.
    pub resume_adapter: Option<String>,
    pub use_overrides: bool,
    pub overrides: LoraOverrides,
}

impl Default for LoraJob {
    fn default() -> Self {
        Self {
            dataset_id: String::new(),
            fetch_remote_config: true,
            fail_if_no_remote: false,
            new_adapter_path: DEFAULT_ADAPTER_PATH.to_string(),
            resume_adapter: None,
            use_overrides: false,
            overrides: LoraOverrides::default(),
        }
    }
}

impl LoraJob {
    pub fn new(dataset_id: impl Into<String>, new_adapter_path: impl Into<String>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            new_adapter_path: new_adapter_path.into(),
            ..Default::default()
        }
    }

    pub fn policy(&self) -> RemotePolicy {
        RemotePolicy {
            fetch_remote: self.fetch_remote_config,
            fail_if_no_remote: self.fail_if_no_remote,
        }
    }
}

impl CourierClient {
    /// Build the training config for a dataset and render it.
    pub async fn generate_lora_config(&self, job: &LoraJob) -> Result<ConfigRecord> {
        let span = tracing::info_span!(
            "lora_config",
            request_id = %Uuid::new_v4(),
            dataset_id = %job.dataset_id
        );
        async move {
            let policy = job.policy();
            let fetch = if policy.fetch_remote {
                self.fetch_remote_config(&job.dataset_id).await
            } else {
                RemoteFetch::NotRequested
            };
            let base = lora::select_base(fetch, policy, &job.dataset_id)?;

            let mut config = lora::merge(
                base,
                &job.dataset_id,
                Some(&job.overrides),
                job.use_overrides,
            );
            let resume = job.resume_adapter.as_deref();
            lora::attach_paths(&mut config, &job.new_adapter_path, resume);
            let yaml = lora::render(&config, &job.new_adapter_path, resume);
            info!(keys = config.as_map().len(), "LoRA config generated");

            Ok(ConfigRecord {
                dataset_id: job.dataset_id.clone(),
                yaml,
                config,
                new_adapter_path: job.new_adapter_path.clone(),
                resume_adapter: resume
                    .filter(|s| !s.trim().is_empty())
                    .map(str::to_string),
            })
        }
        .instrument(span)
        .await
    }

    async fn fetch_remote_config(&self, dataset_id: &str) -> RemoteFetch {
        let request = HttpRequest::get(self.credentials.endpoint(&lora::remote_config_path(dataset_id)))
            .with_header("Authorization", self.credentials.api_key());
        match self.send(&request).await {
            Ok(RawResponse::Json(v)) => RemoteFetch::from_value(v),
            Ok(RawResponse::Text(_)) => RemoteFetch::Fetched(None),
            Err(e) => RemoteFetch::Failed(e),
        }
    }
}
