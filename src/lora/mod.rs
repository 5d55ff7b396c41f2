//! LoRA fine-tuning config overlay.
//!
//! A config is built from three layers and then rendered:
//!
//! 1. base: the remote config for the dataset, or [`LoraConfig::defaults`]
//!    ([`select_base`] decides, following [`RemotePolicy`])
//! 2. `dataset_id` from the call, then meaningful overrides ([`merge`])
//! 3. adapter paths from the call ([`attach_paths`])
//!
//! [`render`] turns the result into the YAML document the trainer reads.
//!
//! ```
//! use courier_gateway::lora::{attach_paths, merge, render, LoraConfig, LoraOverrides};
//! use serde_json::json;
//!
//! let overrides = LoraOverrides::default()
//!     .set("batch_size", json!(0))
//!     .set("rank", json!(16));
//! let mut config = merge(LoraConfig::defaults(), "ds-1", Some(&overrides), true);
//! attach_paths(&mut config, "/adapters/new", None);
//!
//! assert_eq!(config.get("batch_size"), Some(&json!(4)));
//! assert!(render(&config, "/adapters/new", None).contains("  rank: 16"));
//! ```

pub mod config;
pub mod render;

pub use config::{
    attach_paths, is_meaningful, merge, select_base, LoraConfig, LoraOverrides, RemoteFetch,
    RemotePolicy,
};
pub use render::render;

/// Path of the stored config for a dataset, relative to the base URL.
pub fn remote_config_path(dataset_id: &str) -> String {
    format!("/get-lora-config/{}/", dataset_id)
}
