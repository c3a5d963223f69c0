//! Service lookups and environment bindings

use serde::{Deserialize, Serialize};

use super::{ApiGatewayApi, BindType, SERVICE_NOT_FOUND};
use crate::api::common::{null_default, paginate, PageParams};
use crate::api::ApiError;

/// Subset of DescribeService used for existence checks
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceInfo {
    #[serde(deserialize_with = "null_default")]
    pub service_id: String,
    #[serde(deserialize_with = "null_default")]
    pub service_name: String,
    #[serde(deserialize_with = "null_default")]
    pub service_desc: String,
    #[serde(deserialize_with = "null_default")]
    pub protocol: String,
    #[serde(deserialize_with = "null_default")]
    pub created_time: String,
    #[serde(deserialize_with = "null_default")]
    pub modified_time: String,
}

/// Usage plan bound to a service, or to one API of it
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct ApiUsagePlan {
    #[serde(deserialize_with = "null_default")]
    pub service_id: String,
    #[serde(deserialize_with = "null_default")]
    pub api_id: String,
    #[serde(deserialize_with = "null_default")]
    pub api_name: String,
    #[serde(deserialize_with = "null_default")]
    pub usage_plan_id: String,
    #[serde(deserialize_with = "null_default")]
    pub usage_plan_name: String,
    #[serde(deserialize_with = "null_default")]
    pub environment: String,
    pub max_request_num: Option<i64>,
    pub max_request_num_pre_sec: Option<i64>,
    #[serde(deserialize_with = "null_default")]
    pub created_time: String,
    #[serde(deserialize_with = "null_default")]
    pub modified_time: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ServiceIdRequest<'a> {
    service_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ServicePlansRequest<'a> {
    service_id: &'a str,
    #[serde(flatten)]
    page: PageParams,
}

/// Body of BindEnvironment / UnBindEnvironment
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct EnvironmentBindingRequest<'a> {
    usage_plan_ids: [&'a str; 1],
    bind_type: &'static str,
    environment: &'a str,
    service_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_ids: Option<[&'a str; 1]>,
}

impl<'a> EnvironmentBindingRequest<'a> {
    fn new(
        service_id: &'a str,
        plan_id: &'a str,
        environment: &'a str,
        bind_type: BindType,
        api_id: Option<&'a str>,
    ) -> Self {
        Self {
            usage_plan_ids: [plan_id],
            bind_type: bind_type.as_str(),
            environment,
            service_id,
            api_ids: match bind_type {
                BindType::Api => api_id.map(|id| [id]),
                BindType::Service => None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiUsagePlanPage {
    #[serde(default, deserialize_with = "null_default")]
    api_usage_plan_list: Vec<ApiUsagePlan>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ServiceUsagePlanPage {
    #[serde(default, deserialize_with = "null_default")]
    service_usage_plan_list: Vec<ApiUsagePlan>,
}

impl ApiGatewayApi<'_> {
    /// DescribeService; `None` when the service does not exist
    pub async fn describe_service(&self, id: &str) -> Result<Option<ServiceInfo>, ApiError> {
        match self
            .call::<_, ServiceInfo>("DescribeService", &ServiceIdRequest { service_id: id })
            .await
        {
            Ok(info) => Ok(Some(info)),
            Err(e) if e.is_code(SERVICE_NOT_FOUND) => {
                tracing::debug!(service_id = id, "service not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// DescribeApiUsagePlan: plans bound to single APIs of a service
    pub async fn describe_api_usage_plans(
        &self,
        service_id: &str,
    ) -> Result<Vec<ApiUsagePlan>, ApiError> {
        paginate(|page| async move {
            let request = ServicePlansRequest { service_id, page };
            let result: ApiUsagePlanPage = self
                .call_result("DescribeApiUsagePlan", &request)
                .await?;
            Ok(result.api_usage_plan_list)
        })
        .await
    }

    /// DescribeServiceUsagePlan: plans bound to the whole service
    pub async fn describe_service_usage_plans(
        &self,
        service_id: &str,
    ) -> Result<Vec<ApiUsagePlan>, ApiError> {
        paginate(|page| async move {
            let request = ServicePlansRequest { service_id, page };
            let result: ServiceUsagePlanPage = self
                .call_result("DescribeServiceUsagePlan", &request)
                .await?;
            Ok(result.service_usage_plan_list)
        })
        .await
    }

    /// Plans bound to a service for the given scope
    pub async fn describe_bound_usage_plans(
        &self,
        service_id: &str,
        bind_type: BindType,
    ) -> Result<Vec<ApiUsagePlan>, ApiError> {
        match bind_type {
            BindType::Api => self.describe_api_usage_plans(service_id).await,
            BindType::Service => self.describe_service_usage_plans(service_id).await,
        }
    }

    pub async fn bind_environment(
        &self,
        service_id: &str,
        plan_id: &str,
        environment: &str,
        bind_type: BindType,
        api_id: Option<&str>,
    ) -> Result<(), ApiError> {
        let request =
            EnvironmentBindingRequest::new(service_id, plan_id, environment, bind_type, api_id);
        self.call_ok("BindEnvironment", &request).await
    }

    pub async fn unbind_environment(
        &self,
        service_id: &str,
        plan_id: &str,
        environment: &str,
        bind_type: BindType,
        api_id: Option<&str>,
    ) -> Result<(), ApiError> {
        let request =
            EnvironmentBindingRequest::new(service_id, plan_id, environment, bind_type, api_id);
        self.call_ok("UnBindEnvironment", &request).await
    }
}
