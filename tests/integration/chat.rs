use crate::mock_server::{MockServerFixture, API_KEY};
use courier_gateway::{ChatParams, Error, Provider};
use mockito::Matcher;
use serde_json::json;

const NATIVE_MODEL: &str =
    r#"{"name":"llama-3-8b","id":"m-1","type":"text-text","api_type":"mlx"}"#;

#[tokio::test]
async fn native_text_chat_sends_system_and_user_turns() {
    let mut fx = MockServerFixture::new().await;
    let mock = fx
        .server
        .mock("POST", "/inference/")
        .match_header("authorization", API_KEY)
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "model_name": "llama-3-8b",
            "model_id": "m-1",
            "model_type": "text-text",
            "temperature": 0.2,
            "messages": [
                {"role": "system", "content": "S"},
                {"role": "user", "content": "P"}
            ],
            "stream": false
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"content":"echo P","model":"llama-3-8b","prompt_tokens":4,"tokens_per_second":55.1}"#)
        .create_async()
        .await;

    let params = ChatParams::text(NATIVE_MODEL, "P").system_prompt("S");
    let result = fx.client().chat(&params).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.text(), "echo P");
    assert_eq!(result.output(), Some(&json!("echo P")));
    assert_eq!(result.prompt_tokens(), 4);
    assert_eq!(result.get("tokens_per_second"), Some(&json!(55.1)));
}

#[tokio::test]
async fn openai_chat_uses_bearer_and_strict_shape() {
    let mut fx = MockServerFixture::new().await;
    let mock = fx
        .server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", format!("Bearer {}", API_KEY).as_str())
        .match_body(Matcher::PartialJson(json!({
            "model": "qwen2.5",
            "messages": [{"role": "user", "content": "hi"}],
            "stream": false,
            "response_format": {
                "type": "json_schema",
                "json_schema": {"schema": {
                    "type": "object",
                    "properties": {"answer": {"type": "string"}, "thought": {"type": "string"}},
                    "required": ["answer", "thought"]
                }}
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "chatcmpl-1",
                "model": "qwen2.5",
                "choices": [{"message": {"role": "assistant", "content": "{\"answer\":\"4\"}"}}],
                "usage": {"prompt_tokens": 9, "completion_tokens": 3}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let params = ChatParams::messages(
        r#"{"name":"qwen2.5","id":"qwen2.5","type":"text-text","api_type":"openai"}"#,
        json!(r#"[{"role":"user","content":"hi"}]"#),
    )
    .provider(Provider::OpenAiCompatible)
    .json_schema(json!(r#"{"answer": "string"}"#));
    let result = fx.client().chat(&params).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.text(), r#"{"answer":"4"}"#);
    assert_eq!(result.model(), "qwen2.5");
    assert_eq!(result.prompt_tokens(), 9);
    assert_eq!(result.generation_tokens(), 3);
    assert_eq!(result.peak_memory(), Some(0.0));
    assert!(result.get("id").is_none());
}

#[tokio::test]
async fn native_structured_answer_is_passed_through() {
    let mut fx = MockServerFixture::new().await;
    fx.server
        .mock("POST", "/inference/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"content":{"answer":"4","thought":"t"},"peak_memory":4.56}"#)
        .create_async()
        .await;

    let params = ChatParams::text(NATIVE_MODEL, "2+2?").json_schema(json!({"answer": "string"}));
    let result = fx.client().chat(&params).await.unwrap();

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "content": {"answer": "4", "thought": "t"},
            "peak_memory": 4.56,
            "output": {"answer": "4", "thought": "t"}
        })
    );
}

#[tokio::test]
async fn tool_call_turns_are_forwarded_untouched() {
    let turns = json!([
        {"role": "user", "content": "weather?"},
        {"role": "assistant", "tool_calls": [{"id": "c1", "type": "function"}]},
        {"role": "tool", "tool_call_id": "c1", "content": "sunny"}
    ]);
    let mut fx = MockServerFixture::new().await;
    let mock = fx
        .server
        .mock("POST", "/inference/")
        .match_body(Matcher::PartialJson(json!({"messages": turns.clone()})))
        .with_status(200)
        .with_body(r#"{"content":"It is sunny."}"#)
        .create_async()
        .await;

    let params = ChatParams::messages(NATIVE_MODEL, turns);
    let result = fx.client().chat(&params).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.text(), "It is sunny.");
}

#[tokio::test]
async fn recovered_model_name_is_sent() {
    let mut fx = MockServerFixture::new().await;
    let mock = fx
        .server
        .mock("POST", "/inference/")
        .match_body(Matcher::PartialJson(json!({
            "model_name": "Qwen",
            "model_id": null,
            "model_type": "image-text-text"
        })))
        .with_status(200)
        .with_body(r#"{"content":"ok"}"#)
        .create_async()
        .await;

    let params = ChatParams::text("Qwen | 8192 | image", "describe");
    fx.client().chat(&params).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn backend_error_status_is_a_transport_error() {
    let mut fx = MockServerFixture::new().await;
    fx.server
        .mock("POST", "/inference/")
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;

    let err = fx
        .client()
        .chat(&ChatParams::text("llama", "hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn invalid_message_json_fails_before_sending() {
    let mut fx = MockServerFixture::new().await;
    let mock = fx
        .server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let params = ChatParams::messages("llama", json!("[{not json"));
    let err = fx.client().chat(&params).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput { .. }));
    mock.assert_async().await;
}
