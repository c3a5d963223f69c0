//! Error types for the provider

use crate::api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("id is broken: {0}")]
    BrokenId(String),

    #[error("{kind} {id} not exist")]
    NotFound { kind: &'static str, id: String },

    #[error("Provider not configured")]
    NotConfigured,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid state: {0}")]
    State(String),

    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    #[error("{0} does not support in-place update")]
    UpdateNotSupported(String),
}

impl ProviderError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        ProviderError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
