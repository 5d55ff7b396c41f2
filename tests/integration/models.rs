use crate::mock_server::{MockServerFixture, API_KEY};
use courier_gateway::client::{ManageAction, Quantization};
use courier_gateway::types::{ModelDescriptor, ModelType};
use courier_gateway::Provider;
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn native_models_are_shaped_into_options() {
    let mut fx = MockServerFixture::new().await;
    let mock = fx
        .server
        .mock("GET", "/get-workbench-models/")
        .match_header("authorization", API_KEY)
        .with_status(200)
        .with_body(
            json!({"models": [{
                "name": "llama-3-8b", "nickname": "Llama 3", "model_id": "m-1",
                "model_type": "text-text", "context_window": 8192, "api_type": "mlx"
            }]})
            .to_string(),
        )
        .create_async()
        .await;

    let options = fx.client().list_models(Provider::Native).await.unwrap();
    mock.assert_async().await;

    assert_eq!(options.len(), 1);
    assert_eq!(options[0].name, "Llama 3 (8192 | mlx)");
    let model = ModelDescriptor::resolve(&options[0].value)
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(model.id.as_deref(), Some("m-1"));
    assert_eq!(model.model_type, ModelType::TextText);
}

#[tokio::test]
async fn openai_models_use_bearer() {
    let mut fx = MockServerFixture::new().await;
    fx.server
        .mock("GET", "/v1/models")
        .match_header("authorization", format!("Bearer {}", API_KEY).as_str())
        .with_status(200)
        .with_body(r#"{"object":"list","data":[{"id":"a"},{"id":"b"}]}"#)
        .create_async()
        .await;

    let options = fx
        .client()
        .list_models(Provider::OpenAiCompatible)
        .await
        .unwrap();
    let names: Vec<_> = options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["a (OpenAI)", "b (OpenAI)"]);
}

#[tokio::test]
async fn load_and_unload_post_model_id() {
    let mut fx = MockServerFixture::new().await;
    let load = fx
        .server
        .mock("POST", "/model/load")
        .match_body(Matcher::Json(json!({"model_id": "m-1", "quantization": "q8_0"})))
        .with_status(200)
        .with_body(r#"{"status":"loaded"}"#)
        .create_async()
        .await;
    let unload = fx
        .server
        .mock("POST", "/model/unload")
        .match_body(Matcher::Json(json!({"model_id": "m-1"})))
        .with_status(200)
        .with_body(r#"{"status":"unloaded"}"#)
        .create_async()
        .await;

    let client = fx.client();
    let r = client
        .manage_model(&ManageAction::Load {
            model_id: "m-1".into(),
            quantization: Quantization::Q8_0,
        })
        .await
        .unwrap();
    assert_eq!(r["status"], "loaded");
    client
        .manage_model(&ManageAction::Unload {
            model_id: "m-1".into(),
        })
        .await
        .unwrap();

    load.assert_async().await;
    unload.assert_async().await;
}

#[tokio::test]
async fn credential_check_returns_backend_json() {
    let mut fx = MockServerFixture::new().await;
    fx.server
        .mock("GET", "/check-validity-status/")
        .match_header("authorization", API_KEY)
        .with_status(200)
        .with_body(r#"{"valid":true}"#)
        .create_async()
        .await;

    let r = fx.client().check_credentials().await.unwrap();
    assert_eq!(r, json!({"valid": true}));
}
