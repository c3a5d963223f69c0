//! tencentcloud_api_gateway_usage_plan

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::lookup_usage_plan;
use crate::api::apigateway::{BindType, UsagePlanEnvironment, USAGE_PLAN_NOT_FOUND};
use crate::api::error::INTERNAL_ERROR;
use crate::error::{ProviderError, Result};
use crate::resource::{OperationContext, Resource};
use crate::retry::{retry, retry_error, Budget, RetryError};
use crate::schema::{AttributeBuilder, AttributeType, IntRangeValidator, Schema, SchemaBuilder};
use crate::state::{Dynamic, ResourceData};

pub const TYPE_NAME: &str = "tencentcloud_api_gateway_usage_plan";

pub const MAX_REQUEST_NUM_LIMIT: i64 = 99_999_999;
pub const MAX_REQUEST_NUM_PRE_SEC_LIMIT: i64 = 2000;

/// Quota values -1 means no limit
pub const UNLIMITED: i64 = -1;

const TIME_DESCRIPTION: &str =
    "in the format of YYYY-MM-DDThh:mm:ssZ according to ISO 8601 standard. UTC time is used.";

pub struct UsagePlanResource;

/// Desired plan settings read from the configuration
struct PlanSettings {
    name: String,
    desc: Option<String>,
    max_request_num: i64,
    max_request_num_pre_sec: i64,
}

impl PlanSettings {
    fn from_data(data: &ResourceData) -> Result<Self> {
        Ok(Self {
            name: data.require_string("usage_plan_name")?.to_string(),
            desc: data
                .get_string("usage_plan_desc")
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            max_request_num: data.get_i64("max_request_num").unwrap_or(UNLIMITED),
            max_request_num_pre_sec: data.get_i64("max_request_num_pre_sec").unwrap_or(UNLIMITED),
        })
    }
}

fn attach_entry(env: UsagePlanEnvironment) -> Dynamic {
    let mut entry = BTreeMap::new();
    entry.insert("service_id".to_string(), Dynamic::from(env.service_id));
    entry.insert("service_name".to_string(), Dynamic::from(env.service_name));
    entry.insert("api_id".to_string(), Dynamic::from(env.api_id));
    entry.insert("api_name".to_string(), Dynamic::from(env.api_name));
    entry.insert("path".to_string(), Dynamic::from(env.path));
    entry.insert("method".to_string(), Dynamic::from(env.method));
    entry.insert("environment".to_string(), Dynamic::from(env.environment));
    entry.insert("modify_time".to_string(), Dynamic::from(env.modified_time));
    entry.insert("create_time".to_string(), Dynamic::from(env.created_time));
    Dynamic::Map(entry)
}

fn attach_list_type() -> AttributeType {
    let fields = [
        "service_id",
        "service_name",
        "api_id",
        "api_name",
        "path",
        "method",
        "environment",
        "modify_time",
        "create_time",
    ];
    AttributeType::Object(
        fields
            .iter()
            .map(|f| (f.to_string(), AttributeType::String))
            .collect(),
    )
}

#[async_trait]
impl Resource for UsagePlanResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .description("Use this resource to create api gateway usage plan.")
            .attribute(
                AttributeBuilder::string("usage_plan_name")
                    .required()
                    .description("Custom usage plan name."),
            )
            .attribute(
                AttributeBuilder::string("usage_plan_desc")
                    .optional()
                    .description("Custom usage plan description."),
            )
            .attribute(
                AttributeBuilder::number("max_request_num")
                    .optional()
                    .default(UNLIMITED)
                    .validator(IntRangeValidator::new(1, MAX_REQUEST_NUM_LIMIT).or_unlimited())
                    .description("Total number of requests allowed. Valid values: -1, [1,99999999]. The default value is -1, which indicates no limit."),
            )
            .attribute(
                AttributeBuilder::number("max_request_num_pre_sec")
                    .optional()
                    .default(UNLIMITED)
                    .validator(
                        IntRangeValidator::new(1, MAX_REQUEST_NUM_PRE_SEC_LIMIT).or_unlimited(),
                    )
                    .description("Limit of requests per second. Valid values: -1, [1,2000]. The default value is -1, which indicates no limit."),
            )
            .attribute(
                AttributeBuilder::string("modify_time")
                    .computed()
                    .description(&format!("Last modified time {}", TIME_DESCRIPTION)),
            )
            .attribute(
                AttributeBuilder::string("create_time")
                    .computed()
                    .description(&format!("Creation time {}", TIME_DESCRIPTION)),
            )
            .attribute(
                AttributeBuilder::list("attach_api_keys", AttributeType::String)
                    .computed()
                    .description("Attach api keys list."),
            )
            .attribute(
                AttributeBuilder::list("attach_list", attach_list_type())
                    .computed()
                    .description("Attach service and api list."),
            )
            .build()
    }

    async fn create(&self, ctx: &OperationContext, data: &mut ResourceData) -> Result<()> {
        let settings = PlanSettings::from_data(data)?;
        let api = ctx.api();
        let api = &api;
        let settings = &settings;

        let id = retry(&ctx.retry, Budget::Write, move || async move {
            api.create_usage_plan(
                &settings.name,
                settings.desc.as_deref(),
                settings.max_request_num,
                settings.max_request_num_pre_sec,
            )
            .await
            .map_err(|e| retry_error(e, &[]))
        })
        .await?;

        data.set_id(&id);
        tracing::info!(usage_plan_id = %id, "usage plan created, waiting until visible");

        let plan_id = id.as_str();
        retry(&ctx.retry, Budget::Read, move || async move {
            match api.describe_usage_plan(plan_id).await {
                Ok(Some(_)) => Ok(()),
                Ok(None) => Err(RetryError::retryable(ProviderError::not_found(
                    "usage plan",
                    plan_id,
                ))),
                Err(e) => Err(retry_error(e, &[INTERNAL_ERROR])),
            }
        })
        .await?;

        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &OperationContext, data: &mut ResourceData) -> Result<()> {
        let id = data.id().to_string();

        let info = match lookup_usage_plan(ctx, &id).await? {
            Some(info) => info,
            None => {
                tracing::warn!(usage_plan_id = %id, "usage plan not found, removing from state");
                data.clear_id();
                return Ok(());
            }
        };

        let api = ctx.api();
        let api = &api;
        let plan_id = id.as_str();
        let mut attach_list = Vec::new();
        for bind_type in BindType::ALL {
            let environments = retry(&ctx.retry, Budget::Read, move || async move {
                api.describe_usage_plan_environments(plan_id, bind_type)
                    .await
                    .map_err(|e| retry_error(e, &[INTERNAL_ERROR]))
            })
            .await?;
            attach_list.extend(environments.into_iter().map(attach_entry));
        }

        data.set("usage_plan_name", info.usage_plan_name);
        data.set("usage_plan_desc", info.usage_plan_desc);
        data.set(
            "max_request_num",
            info.max_request_num.unwrap_or(UNLIMITED),
        );
        data.set(
            "max_request_num_pre_sec",
            info.max_request_num_pre_sec.unwrap_or(UNLIMITED),
        );
        data.set("modify_time", info.modified_time);
        data.set("create_time", info.created_time);
        data.set("attach_list", Dynamic::List(attach_list));
        data.set("attach_api_keys", info.bind_secret_ids);

        Ok(())
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        _prior: &ResourceData,
        data: &mut ResourceData,
    ) -> Result<()> {
        let settings = PlanSettings::from_data(data)?;
        let id = data.id().to_string();
        let api = ctx.api();
        let api = &api;
        let settings = &settings;
        let plan_id = id.as_str();

        retry(&ctx.retry, Budget::Write, move || async move {
            api.modify_usage_plan(
                plan_id,
                &settings.name,
                Some(settings.desc.as_deref().unwrap_or_default()),
                settings.max_request_num,
                settings.max_request_num_pre_sec,
            )
            .await
            .map_err(|e| retry_error(e, &[]))
        })
        .await?;

        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &OperationContext, data: &ResourceData) -> Result<()> {
        let api = ctx.api();
        let api = &api;
        let plan_id = data.id();

        retry(&ctx.retry, Budget::Write, move || async move {
            match api.delete_usage_plan(plan_id).await {
                Ok(()) => Ok(()),
                Err(e) if e.is_code(USAGE_PLAN_NOT_FOUND) => {
                    tracing::info!(usage_plan_id = plan_id, "usage plan already deleted");
                    Ok(())
                }
                Err(e) => Err(retry_error(e, &[INTERNAL_ERROR])),
            }
        })
        .await
    }
}
