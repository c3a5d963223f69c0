//! Provider block configuration with environment fallbacks

use std::collections::BTreeMap;
use std::time::Duration;

use crate::api::client::DEFAULT_ENDPOINT;
use crate::api::Credential;
use crate::diagnostic::Diagnostics;
use crate::ratelimit::DEFAULT_REQUESTS_PER_SECOND;
use crate::retry::{RetryPolicy, DEFAULT_READ_TIMEOUT, DEFAULT_WRITE_TIMEOUT};
use crate::schema::{AttributeBuilder, IntRangeValidator, Schema, SchemaBuilder};
use crate::state::Dynamic;

pub const ENV_SECRET_ID: &str = "TENCENTCLOUD_SECRET_ID";
pub const ENV_SECRET_KEY: &str = "TENCENTCLOUD_SECRET_KEY";
pub const ENV_SECURITY_TOKEN: &str = "TENCENTCLOUD_SECURITY_TOKEN";
pub const ENV_REGION: &str = "TENCENTCLOUD_REGION";
pub const ENV_ENDPOINT: &str = "TENCENTCLOUD_API_GATEWAY_ENDPOINT";
pub const ENV_RATE_LIMIT: &str = "TENCENTCLOUD_RATE_LIMIT";

/// Upper bound for `read_timeout` and `write_timeout`, in seconds
pub const MAX_TIMEOUT_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub secret_id: String,
    pub secret_key: String,
    pub security_token: Option<String>,
    pub region: String,
    pub endpoint: String,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub requests_per_second: u32,
}

fn string_value(values: &BTreeMap<String, Dynamic>, key: &str, env: Option<&str>) -> Option<String> {
    values
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .or_else(|| env.and_then(|name| std::env::var(name).ok()).filter(|s| !s.is_empty()))
}

fn seconds_value(
    values: &BTreeMap<String, Dynamic>,
    key: &str,
    default: Duration,
    diags: &mut Diagnostics,
) -> Duration {
    match values.get(key).filter(|v| !v.is_null()) {
        None => default,
        Some(v) => match v.as_i64() {
            Some(secs) if (1..=MAX_TIMEOUT_SECS).contains(&secs) => Duration::from_secs(secs as u64),
            _ => {
                diags.add_attribute_error(
                    key,
                    format!("{} must be between 1 and {} seconds", key, MAX_TIMEOUT_SECS),
                    format!("Got {:?}", v),
                );
                default
            }
        },
    }
}

impl ProviderConfig {
    /// Resolve the provider block, falling back to the environment.
    ///
    /// Every missing required value yields its own error diagnostic.
    pub fn from_values(values: &BTreeMap<String, Dynamic>) -> Result<Self, Diagnostics> {
        let mut diags = Diagnostics::new();

        let secret_id = string_value(values, "secret_id", Some(ENV_SECRET_ID));
        let secret_key = string_value(values, "secret_key", Some(ENV_SECRET_KEY));
        let security_token = string_value(values, "security_token", Some(ENV_SECURITY_TOKEN));
        let region = string_value(values, "region", Some(ENV_REGION));
        let endpoint = string_value(values, "endpoint", Some(ENV_ENDPOINT))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let read_timeout = seconds_value(values, "read_timeout", DEFAULT_READ_TIMEOUT, &mut diags);
        let write_timeout =
            seconds_value(values, "write_timeout", DEFAULT_WRITE_TIMEOUT, &mut diags);

        let requests_per_second = match values.get("requests_per_second").filter(|v| !v.is_null()) {
            Some(v) => v.as_i64(),
            None => std::env::var(ENV_RATE_LIMIT)
                .ok()
                .map(|s| s.trim().parse::<i64>().unwrap_or(0)),
        };
        let requests_per_second = match requests_per_second {
            None => DEFAULT_REQUESTS_PER_SECOND,
            Some(n) if n > 0 && n <= u32::MAX as i64 => n as u32,
            Some(n) => {
                diags.add_attribute_error(
                    "requests_per_second",
                    "requests_per_second must be a positive integer",
                    format!("Got {} (set in provider config or {} env var)", n, ENV_RATE_LIMIT),
                );
                DEFAULT_REQUESTS_PER_SECOND
            }
        };

        let mut require = |value: Option<String>, key: &str, env: &str| {
            if value.is_none() {
                diags.add_attribute_error(
                    key,
                    format!("{} is required", key),
                    format!("Set {} in the provider block or the {} env var", key, env),
                );
            }
            value.unwrap_or_default()
        };

        let secret_id = require(secret_id, "secret_id", ENV_SECRET_ID);
        let secret_key = require(secret_key, "secret_key", ENV_SECRET_KEY);
        let region = require(region, "region", ENV_REGION);

        if diags.has_errors() {
            return Err(diags);
        }

        Ok(Self {
            secret_id,
            secret_key,
            security_token,
            region,
            endpoint,
            read_timeout,
            write_timeout,
            requests_per_second,
        })
    }

    pub fn credential(&self) -> Credential {
        let credential = Credential::new(&self.secret_id, &self.secret_key);
        match &self.security_token {
            Some(token) => credential.with_token(token),
            None => credential,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.read_timeout, self.write_timeout)
    }

    /// Schema of the provider block
    pub fn schema() -> Schema {
        SchemaBuilder::new()
            .description("TencentCloud API Gateway provider")
            .attribute(
                AttributeBuilder::string("secret_id")
                    .optional()
                    .description("SecretId of the API key. Falls back to TENCENTCLOUD_SECRET_ID."),
            )
            .attribute(
                AttributeBuilder::string("secret_key")
                    .optional()
                    .sensitive()
                    .description("SecretKey of the API key. Falls back to TENCENTCLOUD_SECRET_KEY."),
            )
            .attribute(
                AttributeBuilder::string("security_token")
                    .optional()
                    .sensitive()
                    .description("Session token for temporary credentials. Falls back to TENCENTCLOUD_SECURITY_TOKEN."),
            )
            .attribute(
                AttributeBuilder::string("region")
                    .optional()
                    .description("Region, e.g. ap-guangzhou. Falls back to TENCENTCLOUD_REGION."),
            )
            .attribute(
                AttributeBuilder::string("endpoint")
                    .optional()
                    .description("API Gateway endpoint. Falls back to TENCENTCLOUD_API_GATEWAY_ENDPOINT."),
            )
            .attribute(
                AttributeBuilder::number("read_timeout")
                    .optional()
                    .validator(IntRangeValidator::new(1, MAX_TIMEOUT_SECS))
                    .description("Seconds to keep retrying read operations, at most 86400. Defaults to 180."),
            )
            .attribute(
                AttributeBuilder::number("write_timeout")
                    .optional()
                    .validator(IntRangeValidator::new(1, MAX_TIMEOUT_SECS))
                    .description("Seconds to keep retrying write operations, at most 86400. Defaults to 300."),
            )
            .attribute(
                AttributeBuilder::number("requests_per_second")
                    .optional()
                    .validator(IntRangeValidator::new(1, 10000))
                    .description("Per-action request budget. Falls back to TENCENTCLOUD_RATE_LIMIT, defaults to 20."),
            )
            .build()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_ENV: [&str; 6] = [
        ENV_SECRET_ID,
        ENV_SECRET_KEY,
        ENV_SECURITY_TOKEN,
        ENV_REGION,
        ENV_ENDPOINT,
        ENV_RATE_LIMIT,
    ];

    fn clear_env() {
        for name in ALL_ENV {
            std::env::remove_var(name);
        }
    }

    fn values(pairs: &[(&str, Dynamic)]) -> BTreeMap<String, Dynamic> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    #[serial]
    fn configures_from_env_vars() {
        clear_env();
        std::env::set_var(ENV_SECRET_ID, "AKIDenv");
        std::env::set_var(ENV_SECRET_KEY, "env-secret");
        std::env::set_var(ENV_REGION, "ap-shanghai");
        std::env::set_var(ENV_RATE_LIMIT, "5");

        let config = ProviderConfig::from_values(&BTreeMap::new()).unwrap();
        assert_eq!(config.secret_id, "AKIDenv");
        assert_eq!(config.region, "ap-shanghai");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.requests_per_second, 5);
        assert_eq!(config.read_timeout, Duration::from_secs(180));
        assert_eq!(config.write_timeout, Duration::from_secs(300));
        assert!(config.credential().token.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn block_values_win_over_env() {
        clear_env();
        std::env::set_var(ENV_SECRET_ID, "AKIDenv");
        std::env::set_var(ENV_REGION, "ap-shanghai");

        let config = ProviderConfig::from_values(&values(&[
            ("secret_id", "AKIDblock".into()),
            ("secret_key", "block-secret".into()),
            ("security_token", "tok".into()),
            ("region", "ap-guangzhou".into()),
            ("endpoint", "http://127.0.0.1:9000".into()),
            ("read_timeout", 30i64.into()),
            ("requests_per_second", 2i64.into()),
        ]))
        .unwrap();

        assert_eq!(config.secret_id, "AKIDblock");
        assert_eq!(config.region, "ap-guangzhou");
        assert_eq!(config.endpoint, "http://127.0.0.1:9000");
        assert_eq!(config.read_timeout, Duration::from_secs(30));
        assert_eq!(config.requests_per_second, 2);
        assert_eq!(config.credential().token.as_deref(), Some("tok"));
        assert_eq!(config.retry_policy().read_timeout, Duration::from_secs(30));

        clear_env();
    }

    #[test]
    #[serial]
    fn missing_required_values_each_get_a_diagnostic() {
        clear_env();

        let diags = ProviderConfig::from_values(&BTreeMap::new()).unwrap_err();
        let attributes: Vec<_> = diags
            .iter()
            .filter_map(|d| d.attribute.clone())
            .collect();

        assert_eq!(attributes, vec!["secret_id", "secret_key", "region"]);
    }

    #[test]
    #[serial]
    fn rejects_non_positive_timeouts_and_rates() {
        clear_env();

        let diags = ProviderConfig::from_values(&values(&[
            ("secret_id", "a".into()),
            ("secret_key", "b".into()),
            ("region", "ap-guangzhou".into()),
            ("write_timeout", 0i64.into()),
            ("requests_per_second", (-3i64).into()),
        ]))
        .unwrap_err();

        assert_eq!(diags.len(), 2);
        assert!(diags
            .iter()
            .any(|d| d.attribute.as_deref() == Some("write_timeout")));
        assert!(diags
            .iter()
            .any(|d| d.attribute.as_deref() == Some("requests_per_second")));
    }

    #[test]
    #[serial]
    fn rejects_timeouts_beyond_a_day() {
        clear_env();
        let base = [
            ("secret_id", Dynamic::from("a")),
            ("secret_key", Dynamic::from("b")),
            ("region", Dynamic::from("ap-guangzhou")),
        ];

        let mut huge = values(&base);
        huge.insert("read_timeout".to_string(), Dynamic::Number(1e19));
        let diags = ProviderConfig::from_values(&huge).unwrap_err();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.iter().next().unwrap().attribute.as_deref(), Some("read_timeout"));

        let mut over = values(&base);
        over.insert("write_timeout".to_string(), (MAX_TIMEOUT_SECS + 1).into());
        assert!(ProviderConfig::from_values(&over).is_err());
        assert!(ProviderConfig::schema().validate(&crate::state::ResourceData::from_values(over)).has_errors());

        let mut max = values(&base);
        max.insert("write_timeout".to_string(), MAX_TIMEOUT_SECS.into());
        let config = ProviderConfig::from_values(&max).unwrap();
        assert_eq!(config.write_timeout, Duration::from_secs(86_400));
    }

    #[test]
    fn provider_schema_marks_secrets_sensitive() {
        let schema = ProviderConfig::schema();
        assert!(schema.attribute("secret_key").unwrap().sensitive);
        assert!(schema.attribute("security_token").unwrap().sensitive);
        assert!(!schema.attribute("region").unwrap().sensitive);
    }
}
