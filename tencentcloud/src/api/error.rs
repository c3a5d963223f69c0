use thiserror::Error;

/// Error codes that are always worth another attempt
pub const RETRYABLE_CODES: &[&str] = &[
    "ClientError.NetworkError",
    "ClientError.HttpStatusCodeError",
    "RequestLimitExceeded",
];

pub const INTERNAL_ERROR: &str = "InternalError";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("[TencentCloudSDKError] Code={code}, Message={message}, RequestId={request_id}")]
    Sdk {
        code: String,
        message: String,
        request_id: String,
    },

    #[error("TencentCloud SDK {action} return empty response")]
    EmptyResponse { action: String },

    #[error("TencentCloud SDK {action} reported failure")]
    OperationFailed { action: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Failed to sign request: {0}")]
    Signing(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ApiError {
    pub fn empty_response(action: &str) -> Self {
        ApiError::EmptyResponse {
            action: action.to_string(),
        }
    }

    /// Backend error code, when the service answered with one
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Sdk { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_code(&self, expected: &str) -> bool {
        self.code() == Some(expected)
    }

    /// Transport failures, throttling and server-side faults are transient.
    /// `extra_codes` lets a call site widen the set, e.g. with `InternalError`.
    pub fn is_retryable(&self, extra_codes: &[&str]) -> bool {
        match self {
            ApiError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ApiError::Http { status, .. } => *status == 429 || *status >= 500,
            ApiError::Sdk { code, .. } => RETRYABLE_CODES
                .iter()
                .chain(extra_codes.iter())
                .any(|c| code.as_str() == *c || code.starts_with(&format!("{}.", c))),
            _ => false,
        }
    }
}
