//! Base selection and override overlay.

use crate::error::Error;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Keys that always come from the current call, never from base or overrides.
pub const CALL_OWNED_KEYS: [&str; 3] = ["dataset_id", "adapter_path", "resume_adapter"];

/// Overrides for this key treat `-1` as "not set"; `0` is a real value.
pub const DROPOUT_KEY: &str = "dropout";
pub const DROPOUT_UNSET: f64 = -1.0;

/// A flat map of training hyperparameters.
///
/// Key order is preserved: base keys first, then `dataset_id`, then keys only
/// the overrides introduced, then `adapter_path` and `resume_adapter`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoraConfig(Map<String, Value>);

impl LoraConfig {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Built-in hyperparameters used when no remote base is available.
    pub fn defaults() -> Self {
        let map = [
            ("model", json!("llama-3-8b")),
            ("iters", json!(1000)),
            ("num_layers", json!(16)),
            ("batch_size", json!(4)),
            ("learning_rate", json!(0.0001)),
            ("train", json!("all")),
            ("max_seq_length", json!(2048)),
            ("val_batches", json!(10)),
            ("rank", json!(8)),
            ("alpha", json!(16)),
            ("scale", json!(1)),
            ("dropout", json!(0.0)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Caller-supplied override values, applied only where meaningful.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoraOverrides(Map<String, Value>);

impl LoraOverrides {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn set(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Entries that pass [`is_meaningful`] and are not call-owned.
    pub fn meaningful(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().filter(|(k, v)| {
            let keep = !CALL_OWNED_KEYS.contains(&k.as_str()) && is_meaningful(k, v);
            if !keep {
                tracing::debug!(key = %k, "override ignored");
            }
            keep
        })
    }
}

/// Where the base config comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePolicy {
    /// Fetch `/get-lora-config/{dataset_id}/` and use it as the base.
    pub fetch_remote: bool,
    /// Fail instead of falling back to defaults when the fetch yields nothing.
    pub fail_if_no_remote: bool,
}

impl Default for RemotePolicy {
    fn default() -> Self {
        Self {
            fetch_remote: true,
            fail_if_no_remote: false,
        }
    }
}

/// Outcome of the remote base fetch.
#[derive(Debug)]
pub enum RemoteFetch {
    NotRequested,
    /// `None` when the backend answered with nothing usable.
    Fetched(Option<Map<String, Value>>),
    Failed(Error),
}

impl RemoteFetch {
    /// Only a non-empty JSON object counts as a remote config.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) if !map.is_empty() => RemoteFetch::Fetched(Some(map)),
            _ => RemoteFetch::Fetched(None),
        }
    }
}

/// Pick the base config.
///
/// | Fetch | Strict | Result |
/// |-------|--------|--------|
/// | not requested | - | defaults |
/// | non-empty object | - | remote object |
/// | empty | yes | [`Error::ConfigNotFound`] |
/// | failed | yes | the fetch error |
/// | empty or failed | no | defaults |
pub fn select_base(fetch: RemoteFetch, policy: RemotePolicy, dataset_id: &str) -> Result<LoraConfig> {
    if !policy.fetch_remote {
        return Ok(LoraConfig::defaults());
    }
    match fetch {
        RemoteFetch::Fetched(Some(map)) if !map.is_empty() => {
            tracing::debug!(dataset_id, keys = map.len(), "using remote LoRA config");
            Ok(LoraConfig(map))
        }
        RemoteFetch::Fetched(_) if policy.fail_if_no_remote => Err(Error::ConfigNotFound {
            dataset_id: dataset_id.to_string(),
        }),
        RemoteFetch::Failed(e) if policy.fail_if_no_remote => Err(e),
        RemoteFetch::Failed(e) => {
            tracing::warn!(dataset_id, error = %e, "remote LoRA config fetch failed, using defaults");
            Ok(LoraConfig::defaults())
        }
        RemoteFetch::Fetched(_) => {
            tracing::warn!(dataset_id, "no remote LoRA config, using defaults");
            Ok(LoraConfig::defaults())
        }
        RemoteFetch::NotRequested => Ok(LoraConfig::defaults()),
    }
}

/// Whether an override value should replace the base value.
///
/// Empty strings and `null` never apply. Numeric zero does not apply either,
/// except for dropout, whose unset marker is `-1` instead. A zero override for
/// any other numeric field is indistinguishable from "not set" and is dropped.
pub fn is_meaningful(key: &str, value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => {
            let n = n.as_f64().unwrap_or(f64::NAN);
            if key == DROPOUT_KEY {
                n != DROPOUT_UNSET
            } else {
                n != 0.0
            }
        }
        _ => true,
    }
}

/// Layer `dataset_id` and overrides onto the base.
pub fn merge(
    base: LoraConfig,
    dataset_id: &str,
    overrides: Option<&LoraOverrides>,
    use_overrides: bool,
) -> LoraConfig {
    let mut config = base;
    config.insert("dataset_id", Value::String(dataset_id.to_string()));

    if let (true, Some(overrides)) = (use_overrides, overrides) {
        for (key, value) in overrides.meaningful() {
            config.insert(key.clone(), value.clone());
        }
    }
    config
}

/// Set the per-call adapter paths. A blank resume path is stored as `null`.
pub fn attach_paths(config: &mut LoraConfig, adapter_path: &str, resume_adapter: Option<&str>) {
    config.insert("adapter_path", Value::String(adapter_path.to_string()));
    config.insert(
        "resume_adapter",
        non_blank(resume_adapter).map_or(Value::Null, |p| Value::String(p.to_string())),
    );
}

pub(crate) fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(v: Value) -> LoraOverrides {
        match v {
            Value::Object(map) => LoraOverrides::from_map(map),
            _ => panic!("object expected"),
        }
    }

    #[test]
    fn zero_batch_size_is_not_applied() {
        let o = overrides(json!({"batch_size": 0}));
        let c = merge(LoraConfig::defaults(), "ds", Some(&o), true);
        assert_eq!(c.get("batch_size"), Some(&json!(4)));
    }

    #[test]
    fn zero_dropout_is_applied_and_minus_one_is_not() {
        let mut base = LoraConfig::defaults();
        base.insert("dropout", json!(0.05));

        let c = merge(base.clone(), "ds", Some(&overrides(json!({"dropout": 0}))), true);
        assert_eq!(c.get("dropout"), Some(&json!(0)));

        let c = merge(base, "ds", Some(&overrides(json!({"dropout": -1}))), true);
        assert_eq!(c.get("dropout"), Some(&json!(0.05)));
    }

    #[test]
    fn blank_and_null_overrides_are_ignored() {
        let o = overrides(json!({"model": "", "train": null, "rank": 32, "iters": 250}));
        let c = merge(LoraConfig::defaults(), "ds", Some(&o), true);
        assert_eq!(c.get("model"), Some(&json!("llama-3-8b")));
        assert_eq!(c.get("train"), Some(&json!("all")));
        assert_eq!(c.get("rank"), Some(&json!(32)));
        assert_eq!(c.get("iters"), Some(&json!(250)));
    }

    #[test]
    fn overrides_need_opt_in() {
        let o = overrides(json!({"rank": 32}));
        let c = merge(LoraConfig::defaults(), "ds", Some(&o), false);
        assert_eq!(c.get("rank"), Some(&json!(8)));
    }

    #[test]
    fn dataset_id_comes_from_the_call() {
        let mut base = LoraConfig::default();
        base.insert("dataset_id", json!("remote"));
        base.insert("iters", json!(10));
        let o = overrides(json!({"dataset_id": "override", "adapter_path": "/x"}));
        let c = merge(base, "call", Some(&o), true);
        assert_eq!(c.get("dataset_id"), Some(&json!("call")));
        assert!(c.get("adapter_path").is_none());
        // remote key position is kept
        assert_eq!(c.as_map().keys().next().map(String::as_str), Some("dataset_id"));
    }

    #[test]
    fn strict_policy_with_empty_remote_is_config_not_found() {
        let policy = RemotePolicy {
            fetch_remote: true,
            fail_if_no_remote: true,
        };
        let err = select_base(RemoteFetch::from_value(json!({})), policy, "ds-1").unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { ref dataset_id } if dataset_id == "ds-1"));
        assert_eq!(err.to_string(), "No remote LoRA config found for dataset_id=ds-1");
    }

    #[test]
    fn lenient_policy_falls_back_to_defaults() {
        let policy = RemotePolicy::default();
        let failed = RemoteFetch::Failed(Error::Configuration {
            message: "boom".into(),
            context: Default::default(),
        });
        assert_eq!(select_base(failed, policy, "ds").unwrap(), LoraConfig::defaults());
        assert_eq!(
            select_base(RemoteFetch::from_value(Value::Null), policy, "ds").unwrap(),
            LoraConfig::defaults()
        );
    }

    #[test]
    fn remote_object_is_the_base() {
        let base = select_base(
            RemoteFetch::from_value(json!({"model": "mistral", "iters": 50})),
            RemotePolicy::default(),
            "ds",
        )
        .unwrap();
        assert_eq!(base.get("model"), Some(&json!("mistral")));
        assert!(base.get("rank").is_none());
    }

    #[test]
    fn not_fetching_ignores_strictness() {
        let policy = RemotePolicy {
            fetch_remote: false,
            fail_if_no_remote: true,
        };
        let base = select_base(RemoteFetch::NotRequested, policy, "ds").unwrap();
        assert_eq!(base, LoraConfig::defaults());
    }

    #[test]
    fn paths_always_reflect_the_call() {
        let mut c = LoraConfig::defaults();
        c.insert("resume_adapter", json!("/stale"));
        attach_paths(&mut c, "/new", Some("  "));
        assert_eq!(c.get("adapter_path"), Some(&json!("/new")));
        assert_eq!(c.get("resume_adapter"), Some(&Value::Null));
        attach_paths(&mut c, "/new", Some("/old"));
        assert_eq!(c.get("resume_adapter"), Some(&json!("/old")));
    }
}
