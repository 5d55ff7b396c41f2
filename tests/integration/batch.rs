use crate::mock_server::MockServerFixture;
use courier_gateway::batch::{BatchExecutor, BatchExecutorConfig, ItemOutcome};
use courier_gateway::{ChatParams, Error};
use mockito::Matcher;
use serde_json::json;

async fn fixture_with_one_failing_prompt() -> MockServerFixture {
    let mut fx = MockServerFixture::new().await;
    fx.server
        .mock("POST", "/inference/")
        .match_body(Matcher::PartialJson(json!({"messages": [{"role": "user", "content": "bad"}]})))
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;
    fx.server
        .mock("POST", "/inference/")
        .match_body(Matcher::Regex(r#""content":"(one|three)""#.to_string()))
        .with_status(200)
        .with_body(r#"{"content":"ok"}"#)
        .create_async()
        .await;
    fx
}

fn params() -> Vec<ChatParams> {
    ["one", "bad", "three"]
        .iter()
        .map(|p| ChatParams::text("llama", *p).system_prompt(""))
        .collect()
}

#[tokio::test]
async fn continue_on_fail_yields_error_record_in_place() {
    let fx = fixture_with_one_failing_prompt().await;
    let client = fx.client();
    let exec = BatchExecutor::with_config(BatchExecutorConfig::new().with_continue_on_error(true));

    let result = exec
        .execute(params(), |p| {
            let client = client.clone();
            async move { client.chat(&p).await }
        })
        .await
        .unwrap();

    let out = serde_json::to_value(&result.outcomes).unwrap();
    assert_eq!(out[0]["content"], "ok");
    assert!(out[1]["error"].as_str().unwrap().contains("500"));
    assert_eq!(out[2]["content"], "ok");
    assert!(matches!(result.outcomes[1], ItemOutcome::Failed(_)));
}

#[tokio::test]
async fn first_failure_aborts_without_continue_on_fail() {
    let fx = fixture_with_one_failing_prompt().await;
    let client = fx.client();
    let exec = BatchExecutor::new();

    let err = exec
        .execute(params(), |p| {
            let client = client.clone();
            async move { client.chat(&p).await }
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("500"));
    assert_eq!(err.item_index(), Some(1));
    assert!(matches!(err.inner(), Error::Transport(_)));
}
