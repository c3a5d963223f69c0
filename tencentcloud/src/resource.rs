//! Resource trait and per-operation context
//!
//! Resources are stateless; everything an operation needs (client, rate
//! limiter, retry budgets, log id) travels in the [`OperationContext`].

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::apigateway::ApiGatewayApi;
use crate::api::Client;
use crate::diagnostic::Diagnostics;
use crate::error::{ProviderError, Result};
use crate::ratelimit::RateLimiter;
use crate::resources::ResourceId;
use crate::retry::RetryPolicy;
use crate::schema::Schema;
use crate::state::ResourceData;

/// Dependencies and logging identity of one lifecycle operation
#[derive(Clone)]
pub struct OperationContext {
    pub log_id: String,
    pub client: Client,
    pub limiter: Arc<dyn RateLimiter>,
    pub retry: RetryPolicy,
}

impl OperationContext {
    pub fn new(client: Client, limiter: Arc<dyn RateLimiter>, retry: RetryPolicy) -> Self {
        Self {
            log_id: Uuid::new_v4().to_string(),
            client,
            limiter,
            retry,
        }
    }

    pub fn api(&self) -> ApiGatewayApi<'_> {
        self.client.apigateway(self.limiter.as_ref())
    }

    /// Span carrying the operation name and log id
    pub fn span(&self, type_name: &str, operation: &str) -> tracing::Span {
        tracing::info_span!(
            "resource",
            op = %format!("resource.{}.{}", type_name, operation),
            log_id = %self.log_id
        )
    }
}

/// Base trait for resources
///
/// `read` signals "gone" by clearing the id of `data`, never by an error.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name, e.g. "tencentcloud_api_gateway_usage_plan"
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Schema checks plus any cross-attribute rules; runs before remote calls
    fn validate(&self, data: &ResourceData) -> Diagnostics {
        self.schema().validate(data)
    }

    async fn create(&self, ctx: &OperationContext, data: &mut ResourceData) -> Result<()>;

    async fn read(&self, ctx: &OperationContext, data: &mut ResourceData) -> Result<()>;

    /// `data` holds the planned values and the prior id.
    ///
    /// Without an override only a refresh is possible: any change to a
    /// configurable attribute that is not force-new is rejected.
    async fn update(
        &self,
        ctx: &OperationContext,
        prior: &ResourceData,
        data: &mut ResourceData,
    ) -> Result<()> {
        let changed = self
            .schema()
            .attributes
            .iter()
            .filter(|attr| (attr.required || attr.optional) && !attr.force_new)
            .any(|attr| prior.get(&attr.name) != data.get(&attr.name));
        if changed {
            return Err(ProviderError::UpdateNotSupported(self.type_name().to_string()));
        }
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &OperationContext, data: &ResourceData) -> Result<()>;

    /// Rebuild state from an import id; `None` when nothing exists under it
    async fn import(&self, ctx: &OperationContext, id: &str) -> Result<Option<ResourceData>> {
        let id = ResourceId::plain(id)?;
        let mut data = ResourceData::with_id(id.to_string());
        self.read(ctx, &mut data).await?;
        Ok(if data.has_id() { Some(data) } else { None })
    }
}

/// Outcome of a state-producing operation
#[derive(Debug, Default)]
pub struct ResourceResponse {
    /// `None` when the resource no longer exists
    pub state: Option<ResourceData>,
    pub diagnostics: Diagnostics,
}

impl ResourceResponse {
    pub fn with_state(state: ResourceData) -> Self {
        Self {
            state: Some(state),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn from_diagnostics(diagnostics: Diagnostics) -> Self {
        Self {
            state: None,
            diagnostics,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}
