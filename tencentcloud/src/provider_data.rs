//! Provider data shared by all resources of a configured provider

use std::sync::Arc;

use crate::api::{ApiError, Client};
use crate::config::ProviderConfig;
use crate::ratelimit::{ActionRateLimiter, RateLimiter};
use crate::resource::OperationContext;
use crate::retry::RetryPolicy;

#[derive(Clone)]
pub struct TencentCloudProviderData {
    pub client: Client,
    pub limiter: Arc<dyn RateLimiter>,
    pub retry: RetryPolicy,
}

impl TencentCloudProviderData {
    pub fn new(client: Client, limiter: Arc<dyn RateLimiter>, retry: RetryPolicy) -> Self {
        Self {
            client,
            limiter,
            retry,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, ApiError> {
        let client = Client::new(&config.endpoint, &config.region, config.credential())?;
        Ok(Self::new(
            client,
            Arc::new(ActionRateLimiter::per_second(config.requests_per_second)),
            config.retry_policy(),
        ))
    }

    /// Fresh context, with its own log id, for one operation
    pub fn context(&self) -> OperationContext {
        OperationContext::new(self.client.clone(), self.limiter.clone(), self.retry.clone())
    }
}
