//! API key actions

use serde::{Deserialize, Serialize};

use super::ApiGatewayApi;
use crate::api::common::{null_default, paginate, Filter, PageParams};
use crate::api::ApiError;

/// API key record from CreateApiKey / DescribeApiKeysStatus
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct ApiKey {
    #[serde(deserialize_with = "null_default")]
    pub access_key_id: String,
    #[serde(deserialize_with = "null_default")]
    pub access_key_secret: String,
    #[serde(deserialize_with = "null_default")]
    pub secret_name: String,
    pub status: Option<i64>,
    #[serde(deserialize_with = "null_default")]
    pub created_time: String,
    #[serde(deserialize_with = "null_default")]
    pub modified_time: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SecretNameRequest<'a> {
    secret_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AccessKeyRequest<'a> {
    access_key_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ApiKeysStatusRequest<'a> {
    #[serde(skip_serializing_if = "<[Filter]>::is_empty")]
    filters: &'a [Filter],
    #[serde(flatten)]
    page: PageParams,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiKeyPage {
    #[serde(default, deserialize_with = "null_default")]
    api_key_set: Vec<ApiKey>,
}

impl ApiGatewayApi<'_> {
    /// CreateApiKey; a result without `AccessKeyId` is an empty response
    pub async fn create_api_key(&self, secret_name: &str) -> Result<ApiKey, ApiError> {
        const ACTION: &str = "CreateApiKey";
        let key: ApiKey = self
            .call_result(ACTION, &SecretNameRequest { secret_name })
            .await?;

        if key.access_key_id.is_empty() {
            return Err(ApiError::empty_response(ACTION));
        }
        Ok(key)
    }

    pub async fn enable_api_key(&self, id: &str) -> Result<(), ApiError> {
        self.call_ok("EnableApiKey", &AccessKeyRequest { access_key_id: id })
            .await
    }

    pub async fn disable_api_key(&self, id: &str) -> Result<(), ApiError> {
        self.call_ok("DisableApiKey", &AccessKeyRequest { access_key_id: id })
            .await
    }

    /// DeleteApiKey; the backend only accepts disabled keys
    pub async fn delete_api_key(&self, id: &str) -> Result<(), ApiError> {
        self.call_ok("DeleteApiKey", &AccessKeyRequest { access_key_id: id })
            .await
    }

    /// DescribeApiKeysStatus with optional name/id filters, all pages
    pub async fn describe_api_keys_status(
        &self,
        secret_name: Option<&str>,
        access_key_id: Option<&str>,
    ) -> Result<Vec<ApiKey>, ApiError> {
        let mut filters = Vec::with_capacity(2);
        if let Some(name) = secret_name.filter(|s| !s.is_empty()) {
            filters.push(Filter::new("SecretName", name));
        }
        if let Some(id) = access_key_id.filter(|s| !s.is_empty()) {
            filters.push(Filter::new("AccessKeyId", id));
        }
        let filters = filters.as_slice();

        paginate(|page| async move {
            let request = ApiKeysStatusRequest { filters, page };
            let result: ApiKeyPage = self
                .call_result("DescribeApiKeysStatus", &request)
                .await?;
            Ok(result.api_key_set)
        })
        .await
    }

    /// Look up one key by id
    pub async fn describe_api_key(&self, id: &str) -> Result<Option<ApiKey>, ApiError> {
        let keys = self.describe_api_keys_status(None, Some(id)).await?;
        Ok(keys.into_iter().next())
    }
}
