//! Terraform-style provider for TencentCloud API Gateway usage plans and keys.

pub mod api;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod logging;
pub mod provider;
pub mod provider_data;
pub mod ratelimit;
pub mod resource;
pub mod resources;
pub mod retry;
pub mod schema;
pub mod state;

pub use diagnostic::{Diagnostic, DiagnosticSeverity, Diagnostics};
pub use error::{ProviderError, Result};
pub use provider::TencentCloudProvider;
pub use provider_data::TencentCloudProviderData;
pub use resource::{OperationContext, Resource, ResourceResponse};
pub use state::{Dynamic, ResourceData};
