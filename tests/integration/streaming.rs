use crate::mock_server::MockServerFixture;
use courier_gateway::{ChatParams, Error, Provider};
use mockito::Matcher;
use serde_json::json;
use std::io::Write;
use std::time::Duration;

#[tokio::test]
async fn streamed_chat_is_accumulated() {
    let mut fx = MockServerFixture::new().await;
    let body = MockServerFixture::sse_body(&[
        r#"{"model":"llama","choices":[{"delta":{"content":"Hel"}}]}"#,
        r#"{"choices":[{"delta":{"content":"lo"}}]}"#,
        r#"{"choices":[{"delta":"#,
        r#"{"choices":[{"delta":{"content":"!"}}],"prompt_tokens":2,"generation_tokens":3}"#,
        "[DONE]",
        r#"{"choices":[{"delta":{"content":" ignored"}}]}"#,
    ]);
    let mock = fx
        .server
        .mock("POST", "/inference/")
        .match_body(Matcher::PartialJson(json!({"stream": true})))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let params = ChatParams::text("llama", "hi").stream(true);
    let result = fx.client().chat(&params).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.text(), "Hello!");
    assert_eq!(result.output(), Some(&json!("Hello!")));
    assert_eq!(result.model(), "llama");
    assert_eq!(result.prompt_tokens(), 2);
    assert_eq!(result.generation_tokens(), 3);
}

#[tokio::test]
async fn openai_stream_reads_usage_block() {
    let mut fx = MockServerFixture::new().await;
    let body = MockServerFixture::sse_body(&[
        r#"{"model":"gpt","choices":[{"delta":{"role":"assistant","content":"A"}}]}"#,
        r#"{"choices":[{"delta":{"content":"B"}}]}"#,
        r#"{"choices":[],"usage":{"prompt_tokens":5,"completion_tokens":2}}"#,
        "[DONE]",
    ]);
    fx.server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let params = ChatParams::text("gpt", "hi")
        .provider(Provider::OpenAiCompatible)
        .stream(true);
    let result = fx.client().chat(&params).await.unwrap();
    assert_eq!(result.text(), "AB");
    assert_eq!(result.prompt_tokens(), 5);
    assert_eq!(result.generation_tokens(), 2);
}

#[tokio::test]
async fn buffered_event_stream_body_is_parsed() {
    let mut fx = MockServerFixture::new().await;
    let body = MockServerFixture::sse_body(&[
        r#"{"choices":[{"delta":{"content":"x"}}]}"#,
        r#"{"choices":[{"message":{"content":"final"}}]}"#,
        "[DONE]",
    ]);
    fx.server
        .mock("POST", "/inference/")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async()
        .await;

    let result = fx.client().chat(&ChatParams::text("llama", "hi")).await.unwrap();
    assert_eq!(result.text(), "final");
}

#[tokio::test]
async fn slow_stream_body_is_not_cut_by_the_request_timeout() {
    let mut fx = MockServerFixture::new().await;
    fx.server
        .mock("POST", "/inference/")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_chunked_body(|w| {
            w.write_all(b"data: {\"choices\":[{\"delta\":{\"content\":\"slow \"}}]}\n\n")?;
            w.flush()?;
            std::thread::sleep(Duration::from_millis(400));
            w.write_all(b"data: {\"choices\":[{\"delta\":{\"content\":\"answer\"}}]}\n\ndata: [DONE]\n\n")
        })
        .create_async()
        .await;

    let client = fx.client_with_timeout(Duration::from_millis(200));
    let streamed = client
        .chat(&ChatParams::text("llama", "hi").stream(true))
        .await
        .unwrap();
    assert_eq!(streamed.text(), "slow answer");

    let err = client.chat(&ChatParams::text("llama", "hi")).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}
