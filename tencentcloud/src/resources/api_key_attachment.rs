//! tencentcloud_api_gateway_api_key_attachment

use async_trait::async_trait;

use super::id::ResourceId;
use super::{lookup_api_key, lookup_usage_plan};
use crate::api::apigateway::USAGE_PLAN_NOT_FOUND;
use crate::api::error::INTERNAL_ERROR;
use crate::error::{ProviderError, Result};
use crate::resource::{OperationContext, Resource};
use crate::retry::{retry, retry_error, Budget};
use crate::schema::{AttributeBuilder, Schema, SchemaBuilder};
use crate::state::ResourceData;

pub const TYPE_NAME: &str = "tencentcloud_api_gateway_api_key_attachment";

pub struct ApiKeyAttachmentResource;

/// (usage_plan_id, api_key_id) out of a `plan#key` id
fn parse_id(id: &str) -> Result<(String, String)> {
    match ResourceId::parse_key_attachment(id)? {
        ResourceId::KeyAttachment {
            usage_plan_id,
            api_key_id,
        } => Ok((usage_plan_id, api_key_id)),
        other => Err(ProviderError::BrokenId(other.to_string())),
    }
}

#[async_trait]
impl Resource for ApiKeyAttachmentResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .description("Use this resource to attach API gateway access key to usage plan.")
            .attribute(
                AttributeBuilder::string("usage_plan_id")
                    .required()
                    .force_new()
                    .description("ID of the usage plan."),
            )
            .attribute(
                AttributeBuilder::string("api_key_id")
                    .required()
                    .force_new()
                    .description("ID of API key."),
            )
            .build()
    }

    async fn create(&self, ctx: &OperationContext, data: &mut ResourceData) -> Result<()> {
        let plan_id = data.require_string("usage_plan_id")?.to_string();
        let key_id = data.require_string("api_key_id")?.to_string();
        let id = ResourceId::key_attachment(&plan_id, &key_id)?;

        if lookup_usage_plan(ctx, &plan_id).await?.is_none() {
            return Err(ProviderError::not_found("usage plan", plan_id));
        }
        if lookup_api_key(ctx, &key_id).await?.is_none() {
            return Err(ProviderError::not_found("api key", key_id));
        }

        let api = ctx.api();
        let api = &api;
        let plan = plan_id.as_str();
        let keys = &[key_id];
        retry(&ctx.retry, Budget::Write, move || async move {
            api.bind_secret_ids(plan, keys)
                .await
                .map_err(|e| retry_error(e, &[]))
        })
        .await?;

        data.set_id(id.encode()?);
        tracing::info!(id = %id, "api key attached");

        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &OperationContext, data: &mut ResourceData) -> Result<()> {
        let (plan_id, key_id) = parse_id(data.id())?;

        if lookup_usage_plan(ctx, &plan_id).await?.is_none() {
            tracing::warn!(usage_plan_id = %plan_id, "usage plan gone, dropping attachment");
            data.clear_id();
            return Ok(());
        }
        if lookup_api_key(ctx, &key_id).await?.is_none() {
            tracing::warn!(api_key_id = %key_id, "api key gone, dropping attachment");
            data.clear_id();
            return Ok(());
        }

        let api = ctx.api();
        let api = &api;
        let plan = plan_id.as_str();
        let secrets = retry(&ctx.retry, Budget::Read, move || async move {
            api.describe_usage_plan_secret_ids(plan)
                .await
                .map_err(|e| retry_error(e, &[INTERNAL_ERROR]))
        })
        .await?;

        if !secrets.iter().any(|s| s.access_key_id == key_id) {
            tracing::warn!(id = %data.id(), "api key not bound, removing from state");
            data.clear_id();
            return Ok(());
        }

        data.set("usage_plan_id", plan_id);
        data.set("api_key_id", key_id);
        Ok(())
    }

    async fn delete(&self, ctx: &OperationContext, data: &ResourceData) -> Result<()> {
        let (plan_id, key_id) = parse_id(data.id())?;
        let api = ctx.api();
        let api = &api;
        let plan = plan_id.as_str();
        let keys = &[key_id];

        retry(&ctx.retry, Budget::Write, move || async move {
            match api.unbind_secret_ids(plan, keys).await {
                Ok(()) => Ok(()),
                Err(e) if e.is_code(USAGE_PLAN_NOT_FOUND) => {
                    tracing::info!(usage_plan_id = plan, "usage plan already gone");
                    Ok(())
                }
                Err(e) => Err(retry_error(e, &[])),
            }
        })
        .await
    }
}
