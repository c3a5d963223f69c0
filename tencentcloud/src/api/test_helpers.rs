//! Test helpers for the API Gateway client

use mockito::{Matcher, Mock, ServerGuard};

pub fn create_test_client(url: &str) -> super::Client {
    super::Client::new(url, "ap-guangzhou", super::Credential::new("AKIDtest", "secret")).unwrap()
}

/// Mock answering `action` with `{"Response": <response>}`
pub async fn mock_action(
    server: &mut ServerGuard,
    action: &str,
    response: serde_json::Value,
) -> Mock {
    server
        .mock("POST", "/")
        .match_header("x-tc-action", action)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "Response": response }).to_string())
        .create_async()
        .await
}

/// Like [`mock_action`] but only matching requests whose body contains `body`
pub async fn mock_action_with_body(
    server: &mut ServerGuard,
    action: &str,
    body: serde_json::Value,
    response: serde_json::Value,
) -> Mock {
    server
        .mock("POST", "/")
        .match_header("x-tc-action", action)
        .match_body(Matcher::PartialJson(body))
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "Response": response }).to_string())
        .create_async()
        .await
}

pub fn sdk_error(code: &str) -> serde_json::Value {
    serde_json::json!({
        "Error": { "Code": code, "Message": format!("{} raised", code) },
        "RequestId": "test-request"
    })
}
