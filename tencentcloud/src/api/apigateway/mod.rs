//! API Gateway (2018-08-08) actions

pub mod api_key;
pub mod service;
pub mod usage_plan;

pub use api_key::ApiKey;
pub use service::{ApiUsagePlan, ServiceInfo};
pub use usage_plan::{UsagePlanBindSecret, UsagePlanEnvironment, UsagePlanInfo};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::common::ResultResponse;
use super::{ApiError, Client};
use crate::ratelimit::RateLimiter;

pub const USAGE_PLAN_NOT_FOUND: &str = "ResourceNotFound.InvalidUsagePlan";
pub const SERVICE_NOT_FOUND: &str = "ResourceNotFound.InvalidService";

/// API Gateway operations bound to a client and an admission port
pub struct ApiGatewayApi<'a> {
    client: &'a Client,
    limiter: &'a dyn RateLimiter,
}

impl<'a> ApiGatewayApi<'a> {
    pub fn new(client: &'a Client, limiter: &'a dyn RateLimiter) -> Self {
        Self { client, limiter }
    }

    async fn call<B, T>(&self, action: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.limiter.check(action).await;
        self.client.call(action, body).await
    }

    async fn call_result<B, T>(&self, action: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response: ResultResponse<T> = self.call(action, body).await?;
        response.into_result(action)
    }

    /// Boolean-result actions: `false` is a failed operation
    async fn call_ok<B>(&self, action: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let ok: bool = self.call_result(action, body).await?;
        if ok {
            Ok(())
        } else {
            Err(ApiError::OperationFailed {
                action: action.to_string(),
            })
        }
    }
}

/// Whether a binding targets a whole service or a single API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BindType {
    #[default]
    Service,
    Api,
}

impl BindType {
    /// Listing order used when flattening a plan's bindings
    pub const ALL: [BindType; 2] = [BindType::Service, BindType::Api];

    pub fn as_str(&self) -> &'static str {
        match self {
            BindType::Service => "SERVICE",
            BindType::Api => "API",
        }
    }
}

impl fmt::Display for BindType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BindType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SERVICE" => Ok(BindType::Service),
            "API" => Ok(BindType::Api),
            other => Err(format!("unknown bind type {:?}, expected SERVICE or API", other)),
        }
    }
}

/// Deployment stage of a gateway service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Test,
    Prepub,
    Release,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Environment::Test, Environment::Prepub, Environment::Release];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Test => "test",
            Environment::Prepub => "prepub",
            Environment::Release => "release",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(Environment::Test),
            "prepub" => Ok(Environment::Prepub),
            "release" => Ok(Environment::Release),
            other => Err(format!(
                "unknown environment {:?}, expected test, prepub or release",
                other
            )),
        }
    }
}

/// API key status; the backend reports it as 1 (on) or 0 (off)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiKeyStatus {
    #[default]
    On,
    Off,
}

impl ApiKeyStatus {
    pub const ALL: [ApiKeyStatus; 2] = [ApiKeyStatus::On, ApiKeyStatus::Off];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyStatus::On => "on",
            ApiKeyStatus::Off => "off",
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ApiKeyStatus::On),
            0 => Some(ApiKeyStatus::Off),
            _ => None,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            ApiKeyStatus::On => 1,
            ApiKeyStatus::Off => 0,
        }
    }
}

impl fmt::Display for ApiKeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiKeyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(ApiKeyStatus::On),
            "off" => Ok(ApiKeyStatus::Off),
            other => Err(format!("unknown api key status {:?}, expected on or off", other)),
        }
    }
}
