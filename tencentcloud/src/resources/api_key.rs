//! tencentcloud_api_gateway_api_key

use async_trait::async_trait;

use super::lookup_api_key;
use crate::api::apigateway::ApiKeyStatus;
use crate::api::error::INTERNAL_ERROR;
use crate::error::{ProviderError, Result};
use crate::resource::{OperationContext, Resource};
use crate::retry::{retry, retry_error, Budget, RetryError};
use crate::schema::{AllowedStringsValidator, AttributeBuilder, Schema, SchemaBuilder};
use crate::state::ResourceData;

pub const TYPE_NAME: &str = "tencentcloud_api_gateway_api_key";

pub struct ApiKeyResource;

fn desired_status(data: &ResourceData) -> Result<ApiKeyStatus> {
    match data.get_string("status") {
        None => Ok(ApiKeyStatus::default()),
        Some(s) => s.parse().map_err(ProviderError::Validation),
    }
}

async fn set_status(ctx: &OperationContext, id: &str, status: ApiKeyStatus) -> Result<()> {
    let api = ctx.api();
    let api = &api;
    retry(&ctx.retry, Budget::Write, move || async move {
        let result = match status {
            ApiKeyStatus::On => api.enable_api_key(id).await,
            ApiKeyStatus::Off => api.disable_api_key(id).await,
        };
        result.map_err(|e| retry_error(e, &[]))
    })
    .await?;
    tracing::info!(access_key_id = id, status = %status, "api key status changed");
    Ok(())
}

#[async_trait]
impl Resource for ApiKeyResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .description("Use this resource to create API gateway access key.")
            .attribute(
                AttributeBuilder::string("secret_name")
                    .required()
                    .force_new()
                    .description("Custom key name."),
            )
            .attribute(
                AttributeBuilder::string("status")
                    .optional()
                    .default(ApiKeyStatus::On.as_str())
                    .validator(AllowedStringsValidator::new(
                        ApiKeyStatus::ALL.iter().map(|s| s.as_str()),
                    ))
                    .description("Key status. Valid values: `on`, `off`."),
            )
            .attribute(
                AttributeBuilder::string("access_key_secret")
                    .computed()
                    .sensitive()
                    .description("Created API key."),
            )
            .attribute(
                AttributeBuilder::string("modify_time")
                    .computed()
                    .description("Last modified time in the format of YYYY-MM-DDThh:mm:ssZ."),
            )
            .attribute(
                AttributeBuilder::string("create_time")
                    .computed()
                    .description("Creation time in the format of YYYY-MM-DDThh:mm:ssZ."),
            )
            .build()
    }

    async fn create(&self, ctx: &OperationContext, data: &mut ResourceData) -> Result<()> {
        let secret_name = data.require_string("secret_name")?.to_string();
        let status = desired_status(data)?;
        let api = ctx.api();
        let api = &api;
        let name = secret_name.as_str();

        let key = retry(&ctx.retry, Budget::Write, move || async move {
            api.create_api_key(name)
                .await
                .map_err(|e| retry_error(e, &[]))
        })
        .await?;

        let id = key.access_key_id;
        data.set_id(&id);
        data.set("access_key_secret", key.access_key_secret);
        tracing::info!(access_key_id = %id, "api key created, waiting until visible");

        let key_id = id.as_str();
        retry(&ctx.retry, Budget::Read, move || async move {
            match api.describe_api_key(key_id).await {
                Ok(Some(_)) => Ok(()),
                Ok(None) => Err(RetryError::retryable(ProviderError::not_found(
                    "api key", key_id,
                ))),
                Err(e) => Err(retry_error(e, &[INTERNAL_ERROR])),
            }
        })
        .await?;

        if status == ApiKeyStatus::Off {
            set_status(ctx, key_id, status).await?;
        }

        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &OperationContext, data: &mut ResourceData) -> Result<()> {
        let id = data.id().to_string();

        let key = match lookup_api_key(ctx, &id).await? {
            Some(key) => key,
            None => {
                tracing::warn!(access_key_id = %id, "api key not found, removing from state");
                data.clear_id();
                return Ok(());
            }
        };

        let status = key
            .status
            .and_then(ApiKeyStatus::from_code)
            .ok_or_else(|| {
                ProviderError::State(format!(
                    "api key {} has unknown status {:?}",
                    id, key.status
                ))
            })?;

        data.set("secret_name", key.secret_name);
        data.set("status", status.as_str());
        // only CreateApiKey returns the secret in full
        if !key.access_key_secret.is_empty() {
            data.set("access_key_secret", key.access_key_secret);
        }
        data.set("modify_time", key.modified_time);
        data.set("create_time", key.created_time);

        Ok(())
    }

    async fn update(
        &self,
        ctx: &OperationContext,
        prior: &ResourceData,
        data: &mut ResourceData,
    ) -> Result<()> {
        let status = desired_status(data)?;
        if desired_status(prior)? != status {
            let id = data.id().to_string();
            set_status(ctx, &id, status).await?;
        }
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &OperationContext, data: &ResourceData) -> Result<()> {
        let id = data.id();

        let key = match lookup_api_key(ctx, id).await? {
            Some(key) => key,
            None => {
                tracing::info!(access_key_id = id, "api key already gone");
                return Ok(());
            }
        };

        if key.status.and_then(ApiKeyStatus::from_code) != Some(ApiKeyStatus::Off) {
            set_status(ctx, id, ApiKeyStatus::Off).await?;
        }

        let api = ctx.api();
        let api = &api;
        retry(&ctx.retry, Budget::Write, move || async move {
            api.delete_api_key(id)
                .await
                .map_err(|e| retry_error(e, &[INTERNAL_ERROR]))
        })
        .await
    }
}
