use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::error::ApiError;
use super::sign::{self, JSON_CONTENT_TYPE};

pub const DEFAULT_ENDPOINT: &str = "https://apigateway.tencentcloudapi.com";
pub const SERVICE: &str = "apigateway";
pub const API_VERSION: &str = "2018-08-08";

/// Access key pair, optionally with a temporary session token
#[derive(Clone)]
pub struct Credential {
    pub secret_id: String,
    pub secret_key: String,
    pub token: Option<String>,
}

impl Credential {
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"***")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// TencentCloud API Gateway client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    endpoint: Url,
    host: String,
    region: String,
    credential: Credential,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Response")]
    response: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SdkErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

impl Client {
    /// Create a new API client with default HTTP settings
    pub fn new(endpoint: &str, region: &str, credential: Credential) -> Result<Self, ApiError> {
        Self::with_config(endpoint, region, credential, HttpConfig::default())
    }

    pub fn with_config(
        endpoint: &str,
        region: &str,
        credential: Credential,
        config: HttpConfig,
    ) -> Result<Self, ApiError> {
        let endpoint = Url::parse(endpoint.trim_end_matches('/'))
            .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;

        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(ApiError::InvalidEndpoint(format!(
                    "{} has no host",
                    endpoint
                )))
            }
        };

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                endpoint,
                host,
                region: region.to_string(),
                credential,
            }),
        })
    }

    pub fn region(&self) -> &str {
        &self.inner.region
    }

    pub fn endpoint(&self) -> &str {
        self.inner.endpoint.as_str()
    }

    /// API Gateway operations, admitted through `limiter`
    pub fn apigateway<'a>(
        &'a self,
        limiter: &'a dyn crate::ratelimit::RateLimiter,
    ) -> crate::api::apigateway::ApiGatewayApi<'a> {
        crate::api::apigateway::ApiGatewayApi::new(self, limiter)
    }

    /// Issue one signed action call and decode `Response` into `T`
    pub async fn call<B, T>(&self, action: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_string(body)
            .map_err(|e| ApiError::Parse(format!("Failed to encode {} request: {}", action, e)))?;
        let timestamp = Utc::now().timestamp();
        let authorization = sign::authorization(
            &self.inner.credential,
            SERVICE,
            &self.inner.host,
            &payload,
            timestamp,
        )?;

        tracing::debug!(action, body = %payload, "api request");

        let mut request = self
            .inner
            .http_client
            .post(self.inner.endpoint.clone())
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header("X-TC-Action", action)
            .header("X-TC-Version", API_VERSION)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Region", &self.inner.region);

        if let Some(token) = &self.inner.credential.token {
            request = request.header("X-TC-Token", token);
        }

        let response = request.body(payload).send().await?;
        let status = response.status();
        let text = response.text().await?;

        tracing::debug!(action, status = status.as_u16(), body = %text, "api response");

        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        Self::parse_envelope(action, &text)
    }

    fn parse_envelope<T: DeserializeOwned>(action: &str, text: &str) -> Result<T, ApiError> {
        let envelope: Envelope = serde_json::from_str(text).map_err(|e| {
            tracing::error!("Failed to deserialize {} response: {}, body: {}", action, e, text);
            ApiError::Parse(format!("Failed to parse {} response: {}", action, e))
        })?;

        let response = envelope
            .response
            .ok_or_else(|| ApiError::empty_response(action))?;

        if let Some(error) = response.get("Error") {
            let body: SdkErrorBody = serde_json::from_value(error.clone())
                .map_err(|e| ApiError::Parse(format!("Malformed {} error: {}", action, e)))?;
            let request_id = response
                .get("RequestId")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();

            return Err(ApiError::Sdk {
                code: body.code,
                message: body.message,
                request_id,
            });
        }

        serde_json::from_value(response).map_err(|e| {
            tracing::error!("Failed to decode {} response: {}, body: {}", action, e, text);
            ApiError::Parse(format!("Failed to parse {} response: {}", action, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::common::ResultResponse;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn test_client(url: &str) -> Client {
        Client::new(url, "ap-guangzhou", Credential::new("AKIDtest", "secret")).unwrap()
    }

    #[tokio::test]
    async fn call_sends_signed_action_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-tc-action", "DeleteApiKey")
            .match_header("x-tc-version", API_VERSION)
            .match_header("x-tc-region", "ap-guangzhou")
            .match_header(
                "authorization",
                Matcher::Regex(r"^TC3-HMAC-SHA256 Credential=AKIDtest/\d{4}-\d{2}-\d{2}/apigateway/tc3_request, SignedHeaders=content-type;host, Signature=[0-9a-f]{64}$".to_string()),
            )
            .match_header("x-tc-token", Matcher::Missing)
            .match_body(Matcher::Json(json!({"AccessKeyId": "AKID1"})))
            .with_body(r#"{"Response":{"Result":true,"RequestId":"r-1"}}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let response: ResultResponse<bool> = client
            .call("DeleteApiKey", &json!({"AccessKeyId": "AKID1"}))
            .await
            .unwrap();

        assert_eq!(response.into_result("DeleteApiKey").unwrap(), true);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn call_forwards_session_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-tc-token", "session-token")
            .with_body(r#"{"Response":{"Result":true}}"#)
            .create_async()
            .await;

        let credential = Credential::new("AKIDtest", "secret").with_token("session-token");
        let client = Client::new(&server.url(), "ap-guangzhou", credential).unwrap();
        let _: ResultResponse<bool> = client.call("EnableApiKey", &json!({})).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn call_lifts_response_error_into_sdk_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_body(
                r#"{"Response":{"Error":{"Code":"ResourceNotFound.InvalidUsagePlan","Message":"not found"},"RequestId":"r-2"}}"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let result: Result<ResultResponse<serde_json::Value>, _> =
            client.call("DescribeUsagePlan", &json!({})).await;

        match result {
            Err(ApiError::Sdk {
                code, request_id, ..
            }) => {
                assert_eq!(code, "ResourceNotFound.InvalidUsagePlan");
                assert_eq!(request_id, "r-2");
            }
            other => panic!("expected SDK error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn call_without_response_object_is_empty_response() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_body(r#"{}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let result: Result<ResultResponse<bool>, _> = client.call("DeleteUsagePlan", &json!({})).await;
        assert!(matches!(result, Err(ApiError::EmptyResponse { .. })));
    }

    #[tokio::test]
    async fn call_maps_http_failures() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let result: Result<ResultResponse<bool>, _> = client.call("DeleteUsagePlan", &json!({})).await;

        match result {
            Err(err @ ApiError::Http { status: 502, .. }) => assert!(err.is_retryable(&[])),
            other => panic!("expected HTTP error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn call_reports_unparseable_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_body("not json")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let result: Result<ResultResponse<bool>, _> = client.call("DeleteUsagePlan", &json!({})).await;
        assert!(matches!(result, Err(ApiError::Parse(_))));
    }

    #[test]
    fn client_rejects_endpoint_without_host() {
        let result = Client::new("not a url", "ap-guangzhou", Credential::new("a", "b"));
        assert!(matches!(result, Err(ApiError::InvalidEndpoint(_))));
    }

    #[test]
    fn client_strips_trailing_slash_and_keeps_port_in_host() {
        let client = Client::new(
            "http://127.0.0.1:8080/",
            "ap-guangzhou",
            Credential::new("a", "b"),
        )
        .unwrap();
        assert_eq!(client.inner.host, "127.0.0.1:8080");
        assert_eq!(client.endpoint(), "http://127.0.0.1:8080/");
        assert_eq!(client.region(), "ap-guangzhou");
    }

    #[test]
    fn credential_debug_hides_secrets() {
        let credential = Credential::new("AKID", "very-secret").with_token("tok");
        let debug = format!("{:?}", credential);
        assert!(debug.contains("AKID"));
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("tok\""));
    }
}
