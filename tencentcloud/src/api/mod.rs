pub mod apigateway;
pub mod client;
pub mod common;
pub mod error;
pub mod sign;

#[cfg(test)]
pub mod test_helpers;

pub use client::{Client, Credential, HttpConfig};
pub use error::ApiError;
