pub mod api_key;
pub mod api_key_attachment;
pub mod id;
pub mod usage_plan;
pub mod usage_plan_attachment;

pub use api_key::ApiKeyResource;
pub use api_key_attachment::ApiKeyAttachmentResource;
pub use id::{BindingKey, ResourceId};
pub use usage_plan::UsagePlanResource;
pub use usage_plan_attachment::UsagePlanAttachmentResource;

use crate::api::apigateway::{ApiKey, ServiceInfo, UsagePlanInfo};
use crate::api::error::INTERNAL_ERROR;
use crate::error::Result;
use crate::resource::{OperationContext, Resource};
use crate::retry::{retry, retry_error, Budget};

/// Every resource this provider serves
pub fn all() -> Vec<Box<dyn Resource>> {
    vec![
        Box::new(UsagePlanResource),
        Box::new(UsagePlanAttachmentResource),
        Box::new(ApiKeyResource),
        Box::new(ApiKeyAttachmentResource),
    ]
}

pub fn by_type_name(type_name: &str) -> Option<Box<dyn Resource>> {
    all().into_iter().find(|r| r.type_name() == type_name)
}

/// DescribeUsagePlan under the read budget
pub(crate) async fn lookup_usage_plan(
    ctx: &OperationContext,
    id: &str,
) -> Result<Option<UsagePlanInfo>> {
    let api = ctx.api();
    let api = &api;
    retry(&ctx.retry, Budget::Read, move || async move {
        api.describe_usage_plan(id)
            .await
            .map_err(|e| retry_error(e, &[INTERNAL_ERROR]))
    })
    .await
}

/// DescribeService under the read budget
pub(crate) async fn lookup_service(ctx: &OperationContext, id: &str) -> Result<Option<ServiceInfo>> {
    let api = ctx.api();
    let api = &api;
    retry(&ctx.retry, Budget::Read, move || async move {
        api.describe_service(id)
            .await
            .map_err(|e| retry_error(e, &[INTERNAL_ERROR]))
    })
    .await
}

/// Key lookup by id under the read budget
pub(crate) async fn lookup_api_key(ctx: &OperationContext, id: &str) -> Result<Option<ApiKey>> {
    let api = ctx.api();
    let api = &api;
    retry(&ctx.retry, Budget::Read, move || async move {
        api.describe_api_key(id)
            .await
            .map_err(|e| retry_error(e, &[INTERNAL_ERROR]))
    })
    .await
}
