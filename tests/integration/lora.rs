use crate::mock_server::MockServerFixture;
use courier_gateway::lora::LoraOverrides;
use courier_gateway::{Error, LoraJob};
use serde_json::{json, Value};

#[tokio::test]
async fn remote_base_with_overrides() {
    let mut fx = MockServerFixture::new().await;
    let mock = fx
        .server
        .mock("GET", "/get-lora-config/ds-1/")
        .with_status(200)
        .with_body(r#"{"model":"mistral-7b","iters":500,"batch_size":2,"learning_rate":0.0002,"train":"all","rank":4,"alpha":8}"#)
        .create_async()
        .await;

    let job = LoraJob {
        use_overrides: true,
        overrides: LoraOverrides::default()
            .set("batch_size", json!(0))
            .set("rank", json!(16))
            .set("dropout", json!(0)),
        resume_adapter: Some("/old".into()),
        ..LoraJob::new("ds-1", "/a/b")
    };
    let record = fx.client().generate_lora_config(&job).await.unwrap();
    mock.assert_async().await;

    assert_eq!(record.dataset_id, "ds-1");
    assert_eq!(record.new_adapter_path, "/a/b");
    assert_eq!(record.resume_adapter.as_deref(), Some("/old"));
    assert_eq!(record.config.get("model"), Some(&json!("mistral-7b")));
    assert_eq!(record.config.get("batch_size"), Some(&json!(2)));
    assert_eq!(record.config.get("rank"), Some(&json!(16)));
    assert_eq!(record.config.get("dropout"), Some(&json!(0)));
    assert_eq!(record.config.get("adapter_path"), Some(&json!("/a/b")));

    let lines: Vec<&str> = record.yaml.lines().collect();
    assert_eq!(lines[0], r#"model: "mistral-7b""#);
    assert!(lines.contains(&"batch_size: 2"));
    assert!(lines.contains(&r#"resume_adapter_file: "/old/adapters.safetensors""#));
    assert!(lines.contains(&"  rank: 16"));
    assert!(lines.contains(&"  dropout: 0"));
    // not in the remote config
    assert!(lines.contains(&"max_seq_length: 0"));
}

#[tokio::test]
async fn strict_policy_without_remote_config_fails() {
    let mut fx = MockServerFixture::new().await;
    fx.server
        .mock("GET", "/get-lora-config/ds-2/")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let job = LoraJob {
        fail_if_no_remote: true,
        ..LoraJob::new("ds-2", "/out")
    };
    let err = fx.client().generate_lora_config(&job).await.unwrap_err();
    assert!(matches!(err, Error::ConfigNotFound { .. }));
}

#[tokio::test]
async fn strict_policy_propagates_fetch_failure() {
    let mut fx = MockServerFixture::new().await;
    fx.server
        .mock("GET", "/get-lora-config/ds-3/")
        .with_status(500)
        .create_async()
        .await;

    let job = LoraJob {
        fail_if_no_remote: true,
        ..LoraJob::new("ds-3", "/out")
    };
    let err = fx.client().generate_lora_config(&job).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn lenient_policy_falls_back_to_defaults() {
    let mut fx = MockServerFixture::new().await;
    fx.server
        .mock("GET", "/get-lora-config/ds-4/")
        .with_status(404)
        .create_async()
        .await;

    let record = fx
        .client()
        .generate_lora_config(&LoraJob::new("ds-4", "/out"))
        .await
        .unwrap();
    assert_eq!(record.config.get("model"), Some(&json!("llama-3-8b")));
    assert_eq!(record.config.get("resume_adapter"), Some(&Value::Null));
    assert!(record.resume_adapter.is_none());
    assert!(!record.yaml.contains("resume_adapter_file"));
}

#[tokio::test]
async fn no_fetch_when_not_requested() {
    let mut fx = MockServerFixture::new().await;
    let mock = fx
        .server
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let job = LoraJob {
        fetch_remote_config: false,
        fail_if_no_remote: true,
        ..LoraJob::new("ds-5", "/out")
    };
    let record = fx.client().generate_lora_config(&job).await.unwrap();
    assert_eq!(record.config.get("iters"), Some(&json!(1000)));
    mock.assert_async().await;
}
