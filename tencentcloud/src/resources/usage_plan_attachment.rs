//! tencentcloud_api_gateway_usage_plan_attachment

use async_trait::async_trait;

use super::id::BindingKey;
use super::{lookup_service, lookup_usage_plan};
use crate::api::apigateway::{ApiUsagePlan, BindType, Environment};
use crate::api::error::INTERNAL_ERROR;
use crate::diagnostic::Diagnostics;
use crate::error::{ProviderError, Result};
use crate::resource::{OperationContext, Resource};
use crate::retry::{retry, retry_error, Budget, RetryError};
use crate::schema::{AllowedStringsValidator, AttributeBuilder, Schema, SchemaBuilder};
use crate::state::ResourceData;

pub const TYPE_NAME: &str = "tencentcloud_api_gateway_usage_plan_attachment";

pub struct UsagePlanAttachmentResource;

fn key_from_data(data: &ResourceData) -> Result<BindingKey> {
    BindingKey::new(
        data.require_string("usage_plan_id")?,
        data.require_string("service_id")?,
        data.require_string("environment")?,
        data.get_string("bind_type")
            .unwrap_or(BindType::default().as_str()),
        data.get_string("api_id").unwrap_or_default(),
    )
}

fn is_bound(plans: &[ApiUsagePlan], key: &BindingKey) -> bool {
    plans.iter().any(|plan| {
        plan.usage_plan_id == key.usage_plan_id()
            && plan.environment == key.environment().as_str()
            && (key.bind_type() == BindType::Service || plan.api_id == key.api_id())
    })
}

fn project_key(key: &BindingKey, data: &mut ResourceData) {
    data.set("usage_plan_id", key.usage_plan_id());
    data.set("service_id", key.service_id());
    data.set("environment", key.environment().as_str());
    data.set("bind_type", key.bind_type().as_str());
    data.set("api_id", key.api_id());
}

#[async_trait]
impl Resource for UsagePlanAttachmentResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .description("Use this resource to attach api gateway usage plan to service.")
            .attribute(
                AttributeBuilder::string("usage_plan_id")
                    .required()
                    .force_new()
                    .description("ID of the usage plan."),
            )
            .attribute(
                AttributeBuilder::string("service_id")
                    .required()
                    .force_new()
                    .description("ID of the service."),
            )
            .attribute(
                AttributeBuilder::string("environment")
                    .required()
                    .force_new()
                    .validator(AllowedStringsValidator::new(
                        Environment::ALL.iter().map(|e| e.as_str()),
                    ))
                    .description("Environment to be bound `test`,`prepub` or `release`."),
            )
            .attribute(
                AttributeBuilder::string("bind_type")
                    .optional()
                    .force_new()
                    .default(BindType::Service.as_str())
                    .validator(AllowedStringsValidator::new(
                        BindType::ALL.iter().map(|b| b.as_str()),
                    ))
                    .description("Binding type. Valid values: `API`, `SERVICE` (default value)."),
            )
            .attribute(
                AttributeBuilder::string("api_id")
                    .optional()
                    .force_new()
                    .description("API id. This parameter will be required when `bind_type` is `API`."),
            )
            .build()
    }

    fn validate(&self, data: &ResourceData) -> Diagnostics {
        let mut diagnostics = self.schema().validate(data);
        if diagnostics.has_errors() {
            return diagnostics;
        }
        if let Err(e) = key_from_data(data) {
            diagnostics.add_attribute_error("api_id", "Invalid usage plan attachment", e.to_string());
        }
        diagnostics
    }

    async fn create(&self, ctx: &OperationContext, data: &mut ResourceData) -> Result<()> {
        let key = key_from_data(data)?;

        if lookup_usage_plan(ctx, key.usage_plan_id()).await?.is_none() {
            return Err(ProviderError::not_found("usage plan", key.usage_plan_id()));
        }
        if lookup_service(ctx, key.service_id()).await?.is_none() {
            return Err(ProviderError::not_found("service", key.service_id()));
        }

        let api = ctx.api();
        let api = &api;
        let binding = &key;
        retry(&ctx.retry, Budget::Write, move || async move {
            api.bind_environment(
                binding.service_id(),
                binding.usage_plan_id(),
                binding.environment().as_str(),
                binding.bind_type(),
                binding.api_id_opt(),
            )
            .await
            .map_err(|e| retry_error(e, &[]))
        })
        .await?;

        data.set_id(key.encode()?);
        tracing::info!(id = %data.id(), "usage plan bound, waiting until visible");

        retry(&ctx.retry, Budget::Read, move || async move {
            match api
                .describe_bound_usage_plans(binding.service_id(), binding.bind_type())
                .await
            {
                Ok(plans) if is_bound(&plans, binding) => Ok(()),
                Ok(_) => Err(RetryError::retryable(ProviderError::not_found(
                    "usage plan binding",
                    binding.usage_plan_id(),
                ))),
                Err(e) => Err(retry_error(e, &[INTERNAL_ERROR])),
            }
        })
        .await?;

        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &OperationContext, data: &mut ResourceData) -> Result<()> {
        let key = BindingKey::decode(data.id())?;

        if lookup_usage_plan(ctx, key.usage_plan_id()).await?.is_none() {
            tracing::warn!(usage_plan_id = key.usage_plan_id(), "usage plan gone, dropping attachment");
            data.clear_id();
            return Ok(());
        }
        if lookup_service(ctx, key.service_id()).await?.is_none() {
            tracing::warn!(service_id = key.service_id(), "service gone, dropping attachment");
            data.clear_id();
            return Ok(());
        }

        let api = ctx.api();
        let api = &api;
        let service_id = key.service_id();
        let bind_type = key.bind_type();
        let plans = retry(&ctx.retry, Budget::Read, move || async move {
            api.describe_bound_usage_plans(service_id, bind_type)
                .await
                .map_err(|e| retry_error(e, &[INTERNAL_ERROR]))
        })
        .await?;

        if !is_bound(&plans, &key) {
            tracing::warn!(id = %data.id(), "binding not found, removing from state");
            data.clear_id();
            return Ok(());
        }

        project_key(&key, data);
        Ok(())
    }

    async fn delete(&self, ctx: &OperationContext, data: &ResourceData) -> Result<()> {
        let key = BindingKey::decode(data.id())?;
        let api = ctx.api();
        let api = &api;
        let binding = &key;

        retry(&ctx.retry, Budget::Write, move || async move {
            api.unbind_environment(
                binding.service_id(),
                binding.usage_plan_id(),
                binding.environment().as_str(),
                binding.bind_type(),
                binding.api_id_opt(),
            )
            .await
            .map_err(|e| retry_error(e, &[]))
        })
        .await
    }
}
