use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tencentcloud::{Dynamic, ResourceData, TencentCloudProvider};

const USAGE_PLAN: &str = "tencentcloud_api_gateway_usage_plan";
const ATTACHMENT: &str = "tencentcloud_api_gateway_usage_plan_attachment";

async fn mock(server: &mut ServerGuard, action: &str, body: Option<Value>, response: Value) -> Mock {
    let mut mock = server.mock("POST", "/").match_header("x-tc-action", action);
    if let Some(body) = body {
        mock = mock.match_body(Matcher::PartialJson(body));
    }
    mock.with_header("content-type", "application/json")
        .with_body(json!({ "Response": response }).to_string())
        .create_async()
        .await
}

fn configured(server: &ServerGuard) -> TencentCloudProvider {
    let mut values = BTreeMap::new();
    values.insert("secret_id".to_string(), Dynamic::from("AKIDtest"));
    values.insert("secret_key".to_string(), Dynamic::from("secret"));
    values.insert("region".to_string(), Dynamic::from("ap-guangzhou"));
    values.insert("endpoint".to_string(), Dynamic::from(server.url()));
    values.insert("read_timeout".to_string(), Dynamic::from(1i64));
    values.insert("write_timeout".to_string(), Dynamic::from(1i64));

    let mut provider = TencentCloudProvider::new();
    let diags = provider.configure(&values);
    assert!(!diags.has_errors(), "{:?}", diags);
    provider
}

#[tokio::test(flavor = "multi_thread")]
async fn usage_plan_lifecycle_with_mock_server() {
    let mut server = Server::new_async().await;

    let create = mock(
        &mut server,
        "CreateUsagePlan",
        Some(json!({
            "UsagePlanName": "my_plan",
            "MaxRequestNum": 100,
            "MaxRequestNumPreSec": 10
        })),
        json!({"Result": {"UsagePlanId": "usagePlan-gyeafpab"}}),
    )
    .await;
    let _describe = mock(
        &mut server,
        "DescribeUsagePlan",
        Some(json!({"UsagePlanId": "usagePlan-gyeafpab"})),
        json!({"Result": {
            "UsagePlanId": "usagePlan-gyeafpab",
            "UsagePlanName": "my_plan",
            "UsagePlanDesc": "",
            "MaxRequestNum": 100,
            "MaxRequestNumPreSec": 10,
            "CreatedTime": "2020-01-01T00:00:00Z",
            "ModifiedTime": "2020-01-01T00:00:00Z",
            "BindSecretIds": []
        }}),
    )
    .await;
    let _environments = mock(
        &mut server,
        "DescribeUsagePlanEnvironments",
        None,
        json!({"Result": {"TotalCount": 0, "EnvironmentList": []}}),
    )
    .await;

    let provider = configured(&server);

    let mut planned = ResourceData::new();
    planned.set("usage_plan_name", "my_plan");
    planned.set("max_request_num", 100i64);
    planned.set("max_request_num_pre_sec", 10i64);

    let created = provider.create(USAGE_PLAN, planned).await;
    assert!(!created.has_errors(), "{:?}", created.diagnostics);
    let state = created.state.unwrap();
    assert_eq!(state.id(), "usagePlan-gyeafpab");
    assert_eq!(state.get_string("usage_plan_name"), Some("my_plan"));
    assert_eq!(state.get_i64("max_request_num"), Some(100));
    assert_eq!(state.get_i64("max_request_num_pre_sec"), Some(10));
    create.assert_async().await;

    let read = provider.read(USAGE_PLAN, state.clone()).await;
    assert_eq!(read.state.as_ref(), Some(&state));

    let _delete = mock(&mut server, "DeleteUsagePlan", None, json!({"Result": true})).await;
    let diags = provider.delete(USAGE_PLAN, &state).await;
    assert!(diags.is_empty(), "{:?}", diags);
}

fn my_plan() -> ResourceData {
    let mut planned = ResourceData::new();
    planned.set("usage_plan_name", "my_plan");
    planned.set("max_request_num", 100i64);
    planned.set("max_request_num_pre_sec", 10i64);
    planned
}

fn plan_not_found() -> Value {
    json!({
        "Error": {"Code": "ResourceNotFound.InvalidUsagePlan", "Message": "not found"},
        "RequestId": "req-1"
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn usage_plan_create_keeps_id_when_plan_never_becomes_visible() {
    let mut server = Server::new_async().await;
    let _create = mock(
        &mut server,
        "CreateUsagePlan",
        None,
        json!({"Result": {"UsagePlanId": "usagePlan-gyeafpab"}}),
    )
    .await;
    let describe = server
        .mock("POST", "/")
        .match_header("x-tc-action", "DescribeUsagePlan")
        .with_body(json!({ "Response": plan_not_found() }).to_string())
        .expect_at_least(2)
        .create_async()
        .await;

    let provider = configured(&server);
    let response = provider.create(USAGE_PLAN, my_plan()).await;

    assert!(response.has_errors());
    let state = response.state.unwrap();
    assert_eq!(state.id(), "usagePlan-gyeafpab");
    describe.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn usage_plan_create_polls_until_plan_is_visible() {
    let mut server = Server::new_async().await;
    let _create = mock(
        &mut server,
        "CreateUsagePlan",
        None,
        json!({"Result": {"UsagePlanId": "usagePlan-gyeafpab"}}),
    )
    .await;
    let not_yet = server
        .mock("POST", "/")
        .match_header("x-tc-action", "DescribeUsagePlan")
        .with_body(json!({ "Response": plan_not_found() }).to_string())
        .expect(1)
        .create_async()
        .await;
    let _describe = mock(
        &mut server,
        "DescribeUsagePlan",
        None,
        json!({"Result": {
            "UsagePlanId": "usagePlan-gyeafpab",
            "UsagePlanName": "my_plan",
            "MaxRequestNum": 100,
            "MaxRequestNumPreSec": 10
        }}),
    )
    .await;
    let _environments = mock(
        &mut server,
        "DescribeUsagePlanEnvironments",
        None,
        json!({"Result": {"TotalCount": 0, "EnvironmentList": []}}),
    )
    .await;

    let provider = configured(&server);
    let response = provider.create(USAGE_PLAN, my_plan()).await;

    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    let state = response.state.unwrap();
    assert_eq!(state.id(), "usagePlan-gyeafpab");
    assert_eq!(state.get_i64("max_request_num"), Some(100));
    not_yet.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn usage_plan_quota_out_of_range_never_reaches_backend() {
    let mut server = Server::new_async().await;
    let any = server.mock("POST", "/").expect(0).create_async().await;

    let provider = configured(&server);
    let mut planned = ResourceData::new();
    planned.set("usage_plan_name", "my_plan");
    planned.set("max_request_num_pre_sec", 2001i64);

    let response = provider.create(USAGE_PLAN, planned).await;
    assert!(response.has_errors());
    assert!(response.state.is_none());
    any.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn api_attachment_without_api_id_is_rejected_offline() {
    let mut server = Server::new_async().await;
    let any = server.mock("POST", "/").expect(0).create_async().await;

    let provider = configured(&server);
    let mut planned = ResourceData::new();
    planned.set("usage_plan_id", "usagePlan-gyeafpab");
    planned.set("service_id", "service-1");
    planned.set("environment", "release");
    planned.set("bind_type", "API");
    planned.set("api_id", "");

    let response = provider.create(ATTACHMENT, planned).await;
    assert!(response.has_errors());
    let diag = response.diagnostics.iter().next().unwrap();
    assert_eq!(diag.attribute.as_deref(), Some("api_id"));
    any.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn service_attachment_without_matching_binding_is_gone() {
    let mut server = Server::new_async().await;
    let _plan = mock(
        &mut server,
        "DescribeUsagePlan",
        None,
        json!({"Result": {"UsagePlanId": "usagePlan-gyeafpab", "UsagePlanName": "my_plan"}}),
    )
    .await;
    let _service = mock(
        &mut server,
        "DescribeService",
        None,
        json!({"ServiceId": "service-1", "ServiceName": "svc"}),
    )
    .await;
    let _bindings = mock(
        &mut server,
        "DescribeServiceUsagePlan",
        Some(json!({"ServiceId": "service-1"})),
        json!({"Result": {"TotalCount": 1, "ServiceUsagePlanList": [
            {"UsagePlanId": "usagePlan-gyeafpab", "Environment": "release"}
        ]}}),
    )
    .await;

    let provider = configured(&server);
    let id = json!({
        "api_id": "",
        "bind_type": "SERVICE",
        "environment": "test",
        "service_id": "service-1",
        "usage_plan_id": "usagePlan-gyeafpab"
    })
    .to_string();

    let response = provider.read(ATTACHMENT, ResourceData::with_id(id)).await;
    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    assert!(response.state.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn import_attachment_from_encoded_id() {
    let mut server = Server::new_async().await;
    let _plan = mock(
        &mut server,
        "DescribeUsagePlan",
        None,
        json!({"Result": {"UsagePlanId": "usagePlan-gyeafpab"}}),
    )
    .await;
    let _service = mock(
        &mut server,
        "DescribeService",
        None,
        json!({"ServiceId": "service-1"}),
    )
    .await;
    let _bindings = mock(
        &mut server,
        "DescribeApiUsagePlan",
        None,
        json!({"Result": {"TotalCount": 1, "ApiUsagePlanList": [
            {"UsagePlanId": "usagePlan-gyeafpab", "Environment": "prepub", "ApiId": "api-1"}
        ]}}),
    )
    .await;

    let provider = configured(&server);
    let id = json!({
        "api_id": "api-1",
        "bind_type": "API",
        "environment": "prepub",
        "service_id": "service-1",
        "usage_plan_id": "usagePlan-gyeafpab"
    })
    .to_string();

    let response = provider.import(ATTACHMENT, &id).await;
    assert!(!response.has_errors(), "{:?}", response.diagnostics);
    let state = response.state.unwrap();
    assert_eq!(state.get_string("api_id"), Some("api-1"));
    assert_eq!(state.get_string("environment"), Some("prepub"));
}
