//! Resource identifiers: bare ids and composite keys

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::apigateway::{BindType, Environment};
use crate::error::{ProviderError, Result};

pub const KEY_ATTACHMENT_SEPARATOR: char = '#';

/// Identity of a usage plan binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingKey {
    usage_plan_id: String,
    service_id: String,
    environment: Environment,
    bind_type: BindType,
    api_id: String,
}

/// Wire form; fields in key order so the token is stable
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct BindingToken {
    api_id: String,
    bind_type: String,
    environment: String,
    service_id: String,
    usage_plan_id: String,
}

impl BindingKey {
    /// Validated key; `api_id` must be set exactly when binding a single API
    pub fn new(
        usage_plan_id: &str,
        service_id: &str,
        environment: &str,
        bind_type: &str,
        api_id: &str,
    ) -> Result<Self> {
        Self::build(usage_plan_id, service_id, environment, bind_type, api_id)
            .map_err(ProviderError::Validation)
    }

    fn build(
        usage_plan_id: &str,
        service_id: &str,
        environment: &str,
        bind_type: &str,
        api_id: &str,
    ) -> std::result::Result<Self, String> {
        if usage_plan_id.is_empty() {
            return Err("usage_plan_id is empty".to_string());
        }
        if service_id.is_empty() {
            return Err("service_id is empty".to_string());
        }
        let environment: Environment = environment.parse()?;
        let bind_type: BindType = bind_type.parse()?;

        match bind_type {
            BindType::Api if api_id.is_empty() => {
                return Err("parameter `api_id` is required when `bind_type` is `API`".to_string())
            }
            BindType::Service if !api_id.is_empty() => {
                return Err(
                    "parameter `api_id` must be empty when `bind_type` is `SERVICE`".to_string(),
                )
            }
            _ => {}
        }

        Ok(Self {
            usage_plan_id: usage_plan_id.to_string(),
            service_id: service_id.to_string(),
            environment,
            bind_type,
            api_id: api_id.to_string(),
        })
    }

    pub fn usage_plan_id(&self) -> &str {
        &self.usage_plan_id
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn bind_type(&self) -> BindType {
        self.bind_type
    }

    /// Empty for whole-service bindings
    pub fn api_id(&self) -> &str {
        &self.api_id
    }

    pub fn api_id_opt(&self) -> Option<&str> {
        Some(self.api_id.as_str()).filter(|id| !id.is_empty())
    }

    pub fn encode(&self) -> Result<String> {
        let token = BindingToken {
            api_id: self.api_id.clone(),
            bind_type: self.bind_type.as_str().to_string(),
            environment: self.environment.as_str().to_string(),
            service_id: self.service_id.clone(),
            usage_plan_id: self.usage_plan_id.clone(),
        };
        serde_json::to_string(&token)
            .map_err(|e| ProviderError::State(format!("build id json fail, {}", e)))
    }

    /// Parse a token produced by [`BindingKey::encode`]
    pub fn decode(token: &str) -> Result<Self> {
        let raw: BindingToken =
            serde_json::from_str(token).map_err(|e| ProviderError::BrokenId(e.to_string()))?;

        Self::build(
            &raw.usage_plan_id,
            &raw.service_id,
            &raw.environment,
            &raw.bind_type,
            &raw.api_id,
        )
        .map_err(ProviderError::BrokenId)
    }
}

/// Identifier kinds used by the resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceId {
    Plain(String),
    Binding(BindingKey),
    KeyAttachment {
        usage_plan_id: String,
        api_key_id: String,
    },
}

impl ResourceId {
    pub fn plain(id: &str) -> Result<Self> {
        if id.trim().is_empty() {
            return Err(ProviderError::BrokenId("empty id".to_string()));
        }
        Ok(ResourceId::Plain(id.to_string()))
    }

    pub fn binding(key: BindingKey) -> Self {
        ResourceId::Binding(key)
    }

    pub fn key_attachment(usage_plan_id: &str, api_key_id: &str) -> Result<Self> {
        if usage_plan_id.is_empty() || api_key_id.is_empty() {
            return Err(ProviderError::Validation(
                "usage_plan_id and api_key_id are both required".to_string(),
            ));
        }
        if usage_plan_id.contains(KEY_ATTACHMENT_SEPARATOR)
            || api_key_id.contains(KEY_ATTACHMENT_SEPARATOR)
        {
            return Err(ProviderError::Validation(format!(
                "ids must not contain '{}'",
                KEY_ATTACHMENT_SEPARATOR
            )));
        }
        Ok(ResourceId::KeyAttachment {
            usage_plan_id: usage_plan_id.to_string(),
            api_key_id: api_key_id.to_string(),
        })
    }

    pub fn parse_binding(token: &str) -> Result<Self> {
        BindingKey::decode(token).map(ResourceId::Binding)
    }

    pub fn parse_key_attachment(token: &str) -> Result<Self> {
        let mut parts = token.split(KEY_ATTACHMENT_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(plan), Some(key), None) if !plan.is_empty() && !key.is_empty() => {
                Ok(ResourceId::KeyAttachment {
                    usage_plan_id: plan.to_string(),
                    api_key_id: key.to_string(),
                })
            }
            _ => Err(ProviderError::BrokenId(format!(
                "expected <usage_plan_id>{}<api_key_id>, got {:?}",
                KEY_ATTACHMENT_SEPARATOR, token
            ))),
        }
    }

    pub fn encode(&self) -> Result<String> {
        match self {
            ResourceId::Plain(id) => Ok(id.clone()),
            ResourceId::Binding(key) => key.encode(),
            ResourceId::KeyAttachment {
                usage_plan_id,
                api_key_id,
            } => Ok(format!(
                "{}{}{}",
                usage_plan_id, KEY_ATTACHMENT_SEPARATOR, api_key_id
            )),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encode() {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_binding_encodes_sorted_fields_with_empty_api_id() {
        let key = BindingKey::new("usagePlan-26t0l0w3", "service-pkegyqmc", "test", "SERVICE", "")
            .unwrap();
        assert_eq!(
            key.encode().unwrap(),
            r#"{"api_id":"","bind_type":"SERVICE","environment":"test","service_id":"service-pkegyqmc","usage_plan_id":"usagePlan-26t0l0w3"}"#
        );
        assert_eq!(key.api_id_opt(), None);
    }

    #[test]
    fn binding_round_trips_all_fields() {
        let key = BindingKey::new("usagePlan-1", "service-1", "release", "API", "api-1").unwrap();
        let decoded = BindingKey::decode(&key.encode().unwrap()).unwrap();

        assert_eq!(decoded, key);
        assert_eq!(decoded.usage_plan_id(), "usagePlan-1");
        assert_eq!(decoded.service_id(), "service-1");
        assert_eq!(decoded.environment(), Environment::Release);
        assert_eq!(decoded.bind_type(), BindType::Api);
        assert_eq!(decoded.api_id(), "api-1");
    }

    #[test]
    fn decode_accepts_keys_in_any_order() {
        let key = BindingKey::decode(
            r#"{"usage_plan_id":"usagePlan-1","service_id":"service-1","environment":"prepub","bind_type":"SERVICE","api_id":""}"#,
        )
        .unwrap();
        assert_eq!(key.environment(), Environment::Prepub);
    }

    #[test]
    fn api_binding_requires_api_id() {
        let err = BindingKey::new("usagePlan-1", "service-1", "test", "API", "").unwrap_err();
        assert!(matches!(err, ProviderError::Validation(ref m) if m.contains("api_id")));
    }

    #[test]
    fn service_binding_rejects_api_id() {
        assert!(matches!(
            BindingKey::new("usagePlan-1", "service-1", "test", "SERVICE", "api-1"),
            Err(ProviderError::Validation(_))
        ));
    }

    #[test]
    fn malformed_tokens_are_broken_ids() {
        for token in [
            "not json",
            "{}",
            r#"{"usage_plan_id":"usagePlan-1","service_id":"service-1","environment":"test"}"#,
            r#"{"usage_plan_id":"usagePlan-1","service_id":"service-1","environment":"staging","bind_type":"SERVICE","api_id":""}"#,
            r#"{"usage_plan_id":"usagePlan-1","service_id":"service-1","environment":"test","bind_type":"API","api_id":""}"#,
        ] {
            assert!(
                matches!(BindingKey::decode(token), Err(ProviderError::BrokenId(_))),
                "{} should be rejected",
                token
            );
        }
    }

    #[test]
    fn key_attachment_id_uses_hash_separator() {
        let id = ResourceId::key_attachment("usagePlan-1", "AKID1").unwrap();
        assert_eq!(id.encode().unwrap(), "usagePlan-1#AKID1");
        assert_eq!(ResourceId::parse_key_attachment("usagePlan-1#AKID1").unwrap(), id);
        assert_eq!(id.to_string(), "usagePlan-1#AKID1");

        for bad in ["usagePlan-1", "#AKID1", "usagePlan-1#", "a#b#c"] {
            assert!(matches!(
                ResourceId::parse_key_attachment(bad),
                Err(ProviderError::BrokenId(_))
            ));
        }
        assert!(ResourceId::key_attachment("a#b", "c").is_err());
    }

    #[test]
    fn plain_ids_must_not_be_empty() {
        assert!(ResourceId::plain("").is_err());
        assert_eq!(
            ResourceId::plain("usagePlan-1").unwrap(),
            ResourceId::Plain("usagePlan-1".to_string())
        );
    }
}
