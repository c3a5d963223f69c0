//! Bounded retry for eventually consistent operations

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::api::ApiError;
use crate::error::ProviderError;

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(180);
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    Retryable,
    Fatal,
}

/// Error returned by one attempt, tagged with whether another attempt may help
#[derive(Debug)]
pub struct RetryError {
    pub class: RetryClass,
    pub error: ProviderError,
}

impl RetryError {
    pub fn retryable(error: impl Into<ProviderError>) -> Self {
        Self {
            class: RetryClass::Retryable,
            error: error.into(),
        }
    }

    pub fn fatal(error: impl Into<ProviderError>) -> Self {
        Self {
            class: RetryClass::Fatal,
            error: error.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.class == RetryClass::Retryable
    }
}

/// Classify an API error, widening the retryable set with `extra_codes`
pub fn retry_error(error: ApiError, extra_codes: &[&str]) -> RetryError {
    if error.is_retryable(extra_codes) {
        RetryError::retryable(error)
    } else {
        RetryError::fatal(error)
    }
}

impl From<ApiError> for RetryError {
    fn from(error: ApiError) -> Self {
        retry_error(error, &[])
    }
}

impl From<ProviderError> for RetryError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::Api(e) => retry_error(e, &[]),
            other => RetryError::fatal(other),
        }
    }
}

/// Which timeout an operation runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Read,
    Write,
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(read_timeout: Duration, write_timeout: Duration) -> Self {
        Self {
            read_timeout,
            write_timeout,
            ..Self::default()
        }
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    pub fn timeout(&self, budget: Budget) -> Duration {
        match budget {
            Budget::Read => self.read_timeout,
            Budget::Write => self.write_timeout,
        }
    }
}

fn next_backoff(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}

/// Deadline used when the budget does not fit in an `Instant`
fn far_future(start: Instant) -> Instant {
    start + Duration::from_secs(100 * 365 * 24 * 60 * 60)
}

/// Run `op` until it succeeds, fails fatally, or the budget runs out.
///
/// On exhaustion the last error is returned unchanged.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    budget: Budget,
    mut op: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RetryError>>,
{
    let timeout = policy.timeout(budget);
    let start = Instant::now();
    let deadline = start.checked_add(timeout).unwrap_or_else(|| far_future(start));
    let mut backoff = policy.initial_backoff;
    let mut attempt: u32 = 1;

    loop {
        let error = match op().await {
            Ok(value) => return Ok(value),
            Err(RetryError {
                class: RetryClass::Fatal,
                error,
            }) => return Err(error),
            Err(RetryError { error, .. }) => error,
        };

        let now = Instant::now();
        if now >= deadline {
            tracing::warn!(
                "Giving up after {} attempts, {:?} budget of {:?} exhausted: {}",
                attempt,
                budget,
                timeout,
                error
            );
            return Err(error);
        }

        let delay = backoff.min(deadline - now);
        tracing::debug!(
            "Attempt {} failed, retrying after {}ms: {}",
            attempt,
            delay.as_millis(),
            error
        );
        tokio::time::sleep(delay).await;

        backoff = next_backoff(backoff, policy.max_backoff);
        attempt += 1;
    }
}
