//! Usage plan actions

use serde::{Deserialize, Serialize};

use super::{ApiGatewayApi, BindType, USAGE_PLAN_NOT_FOUND};
use crate::api::common::{null_default, paginate, PageParams};
use crate::api::ApiError;

/// Usage plan as returned by DescribeUsagePlan
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UsagePlanInfo {
    pub usage_plan_id: String,
    pub usage_plan_name: String,
    #[serde(deserialize_with = "null_default")]
    pub usage_plan_desc: String,
    pub max_request_num: Option<i64>,
    pub max_request_num_pre_sec: Option<i64>,
    #[serde(deserialize_with = "null_default")]
    pub created_time: String,
    #[serde(deserialize_with = "null_default")]
    pub modified_time: String,
    #[serde(deserialize_with = "null_default")]
    pub bind_secret_ids: Vec<String>,
}

/// One service or API environment bound to a usage plan
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct UsagePlanEnvironment {
    #[serde(deserialize_with = "null_default")]
    pub service_id: String,
    #[serde(deserialize_with = "null_default")]
    pub service_name: String,
    #[serde(deserialize_with = "null_default")]
    pub api_id: String,
    #[serde(deserialize_with = "null_default")]
    pub api_name: String,
    #[serde(deserialize_with = "null_default")]
    pub path: String,
    #[serde(deserialize_with = "null_default")]
    pub method: String,
    #[serde(deserialize_with = "null_default")]
    pub environment: String,
    #[serde(deserialize_with = "null_default")]
    pub created_time: String,
    #[serde(deserialize_with = "null_default")]
    pub modified_time: String,
}

/// API key bound to a usage plan
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct UsagePlanBindSecret {
    #[serde(deserialize_with = "null_default")]
    pub access_key_id: String,
    #[serde(deserialize_with = "null_default")]
    pub secret_name: String,
    pub status: Option<i64>,
}

/// Request body shared by CreateUsagePlan and ModifyUsagePlan
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UsagePlanRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_plan_id: Option<&'a str>,
    pub usage_plan_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_plan_desc: Option<&'a str>,
    pub max_request_num: i64,
    pub max_request_num_pre_sec: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct UsagePlanIdRequest<'a> {
    usage_plan_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct EnvironmentsRequest<'a> {
    usage_plan_id: &'a str,
    bind_type: &'static str,
    #[serde(flatten)]
    page: PageParams,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SecretIdsRequest<'a> {
    usage_plan_id: &'a str,
    #[serde(flatten)]
    page: PageParams,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct BindSecretIdsRequest<'a> {
    usage_plan_id: &'a str,
    access_key_ids: &'a [String],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreatedUsagePlan {
    usage_plan_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EnvironmentPage {
    #[serde(default, deserialize_with = "null_default")]
    environment_list: Vec<UsagePlanEnvironment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SecretIdPage {
    #[serde(default, deserialize_with = "null_default")]
    access_key_list: Vec<UsagePlanBindSecret>,
}

impl ApiGatewayApi<'_> {
    /// CreateUsagePlan, returning the new plan id
    pub async fn create_usage_plan(
        &self,
        name: &str,
        desc: Option<&str>,
        max_request_num: i64,
        max_request_num_pre_sec: i64,
    ) -> Result<String, ApiError> {
        const ACTION: &str = "CreateUsagePlan";
        let request = UsagePlanRequest {
            usage_plan_id: None,
            usage_plan_name: name,
            usage_plan_desc: desc,
            max_request_num,
            max_request_num_pre_sec,
        };

        let created: CreatedUsagePlan = self.call_result(ACTION, &request).await?;
        created
            .usage_plan_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::empty_response(ACTION))
    }

    /// DescribeUsagePlan; `None` when the backend does not know the plan
    pub async fn describe_usage_plan(&self, id: &str) -> Result<Option<UsagePlanInfo>, ApiError> {
        let request = UsagePlanIdRequest { usage_plan_id: id };

        match self.call_result("DescribeUsagePlan", &request).await {
            Ok(info) => Ok(Some(info)),
            Err(e) if e.is_code(USAGE_PLAN_NOT_FOUND) => {
                tracing::debug!(usage_plan_id = id, "usage plan not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// ModifyUsagePlan
    pub async fn modify_usage_plan(
        &self,
        id: &str,
        name: &str,
        desc: Option<&str>,
        max_request_num: i64,
        max_request_num_pre_sec: i64,
    ) -> Result<(), ApiError> {
        let request = UsagePlanRequest {
            usage_plan_id: Some(id),
            usage_plan_name: name,
            usage_plan_desc: desc,
            max_request_num,
            max_request_num_pre_sec,
        };

        let _: serde_json::Value = self.call_result("ModifyUsagePlan", &request).await?;
        Ok(())
    }

    /// DeleteUsagePlan
    pub async fn delete_usage_plan(&self, id: &str) -> Result<(), ApiError> {
        self.call_ok("DeleteUsagePlan", &UsagePlanIdRequest { usage_plan_id: id })
            .await
    }

    /// DescribeUsagePlanEnvironments for one bind type, all pages
    pub async fn describe_usage_plan_environments(
        &self,
        id: &str,
        bind_type: BindType,
    ) -> Result<Vec<UsagePlanEnvironment>, ApiError> {
        paginate(|page| async move {
            let request = EnvironmentsRequest {
                usage_plan_id: id,
                bind_type: bind_type.as_str(),
                page,
            };
            let result: EnvironmentPage = self
                .call_result("DescribeUsagePlanEnvironments", &request)
                .await?;
            Ok(result.environment_list)
        })
        .await
    }

    /// DescribeUsagePlanSecretIds, all pages
    pub async fn describe_usage_plan_secret_ids(
        &self,
        id: &str,
    ) -> Result<Vec<UsagePlanBindSecret>, ApiError> {
        paginate(|page| async move {
            let request = SecretIdsRequest {
                usage_plan_id: id,
                page,
            };
            let result: SecretIdPage = self
                .call_result("DescribeUsagePlanSecretIds", &request)
                .await?;
            Ok(result.access_key_list)
        })
        .await
    }

    /// BindSecretIds
    pub async fn bind_secret_ids(&self, plan_id: &str, key_ids: &[String]) -> Result<(), ApiError> {
        let request = BindSecretIdsRequest {
            usage_plan_id: plan_id,
            access_key_ids: key_ids,
        };
        self.call_ok("BindSecretIds", &request).await
    }

    /// UnBindSecretIds
    pub async fn unbind_secret_ids(&self, plan_id: &str, key_ids: &[String]) -> Result<(), ApiError> {
        let request = BindSecretIdsRequest {
            usage_plan_id: plan_id,
            access_key_ids: key_ids,
        };
        self.call_ok("UnBindSecretIds", &request).await
    }
}
