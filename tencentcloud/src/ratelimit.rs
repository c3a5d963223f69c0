//! Admission control applied right before every remote action

use async_trait::async_trait;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter as GovernorLimiter};
use std::num::NonZeroU32;

pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 20;

/// Admission port; `check` returns once `action` may be issued
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn check(&self, action: &str);
}

/// One token bucket per action name
pub struct ActionRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    per_second: u32,
}

impl ActionRateLimiter {
    pub fn per_second(requests: u32) -> Self {
        let rate = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: GovernorLimiter::keyed(Quota::per_second(rate)),
            per_second: rate.get(),
        }
    }

    pub fn requests_per_second(&self) -> u32 {
        self.per_second
    }
}

impl Default for ActionRateLimiter {
    fn default() -> Self {
        Self::per_second(DEFAULT_REQUESTS_PER_SECOND)
    }
}

impl std::fmt::Debug for ActionRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRateLimiter")
            .field("per_second", &self.per_second)
            .finish()
    }
}

#[async_trait]
impl RateLimiter for ActionRateLimiter {
    async fn check(&self, action: &str) {
        let key = action.to_string();
        if self.limiter.check_key(&key).is_err() {
            tracing::debug!(action, "rate limited, waiting for capacity");
            self.limiter.until_key_ready(&key).await;
        }
    }
}

/// Admits everything immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

#[async_trait]
impl RateLimiter for Unlimited {
    async fn check(&self, _action: &str) {}
}
