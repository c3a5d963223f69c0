//! Provider entry point: configuration, schemas and resource dispatch

use std::collections::BTreeMap;
use std::sync::OnceLock;

use tracing::Instrument;

use crate::config::ProviderConfig;
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::error::{ProviderError, Result};
use crate::logging::{self, log_elapsed};
use crate::provider_data::TencentCloudProviderData;
use crate::resource::{OperationContext, Resource, ResourceResponse};
use crate::resources;
use crate::schema::Schema;
use crate::state::{Dynamic, ResourceData};

pub struct TencentCloudProvider {
    data: Option<TencentCloudProviderData>,
}

impl Default for TencentCloudProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TencentCloudProvider {
    pub fn new() -> Self {
        Self { data: None }
    }

    /// Provider that skips `configure`, e.g. pointed at a mock server
    pub fn with_data(data: TencentCloudProviderData) -> Self {
        Self { data: Some(data) }
    }

    pub fn is_configured(&self) -> bool {
        self.data.is_some()
    }

    /// Resolve the provider block and build the shared client.
    ///
    /// Also installs the stderr log subscriber, leveled by `TF_LOG_PROVIDER`
    /// or `TF_LOG`, unless the host already set one.
    pub fn configure(&mut self, values: &BTreeMap<String, Dynamic>) -> Diagnostics {
        logging::init_from_env();

        let mut diags = Self::provider_schema().validate(&ResourceData::from_values(values.clone()));
        if diags.has_errors() {
            return diags;
        }

        let config = match ProviderConfig::from_values(values) {
            Ok(config) => config,
            Err(errors) => {
                diags.extend(errors);
                return diags;
            }
        };

        match TencentCloudProviderData::from_config(&config) {
            Ok(data) => {
                tracing::info!(
                    region = %config.region,
                    endpoint = %config.endpoint,
                    requests_per_second = config.requests_per_second,
                    "provider configured"
                );
                self.data = Some(data);
            }
            Err(e) => diags.add_error("Failed to create API client", e.to_string()),
        }
        diags
    }

    pub fn provider_schema() -> Schema {
        ProviderConfig::schema()
    }

    pub fn resource_schemas() -> &'static BTreeMap<String, Schema> {
        static SCHEMAS: OnceLock<BTreeMap<String, Schema>> = OnceLock::new();

        SCHEMAS.get_or_init(|| {
            resources::all()
                .into_iter()
                .map(|r| (r.type_name().to_string(), r.schema()))
                .collect()
        })
    }

    pub fn resource(&self, type_name: &str) -> Result<Box<dyn Resource>> {
        resources::by_type_name(type_name)
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    /// Defaults applied, then schema and cross-attribute checks
    pub fn validate_resource(&self, type_name: &str, config: &ResourceData) -> Diagnostics {
        let resource = match self.resource(type_name) {
            Ok(resource) => resource,
            Err(e) => return Diagnostic::from_error("validate resource", &e).into(),
        };
        let mut config = config.clone();
        resource.schema().apply_defaults(&mut config);
        resource.validate(&config)
    }

    fn context(&self) -> Result<OperationContext> {
        self.data
            .as_ref()
            .map(TencentCloudProviderData::context)
            .ok_or(ProviderError::NotConfigured)
    }

    fn prepare(&self, type_name: &str) -> Result<(Box<dyn Resource>, OperationContext)> {
        Ok((self.resource(type_name)?, self.context()?))
    }

    pub async fn create(&self, type_name: &str, mut planned: ResourceData) -> ResourceResponse {
        let (resource, ctx) = match self.prepare(type_name) {
            Ok(parts) => parts,
            Err(e) => return failure("create resource", &e),
        };

        resource.schema().apply_defaults(&mut planned);
        let diags = resource.validate(&planned);
        if diags.has_errors() {
            return ResourceResponse::from_diagnostics(diags);
        }

        let result = async {
            let _elapsed = log_elapsed(format!("resource.{}.create", type_name));
            resource.create(&ctx, &mut planned).await
        }
        .instrument(ctx.span(type_name, "create"))
        .await;

        match result {
            Ok(()) if planned.has_id() => ResourceResponse::with_state(planned),
            Ok(()) => failure(
                "create resource",
                &ProviderError::State(format!("{} not found after create", type_name)),
            ),
            Err(e) => ResourceResponse {
                // keep what was created so the next apply can pick it up
                state: planned.has_id().then_some(planned),
                diagnostics: Diagnostic::from_error("create resource", &e).into(),
            },
        }
    }

    pub async fn read(&self, type_name: &str, mut current: ResourceData) -> ResourceResponse {
        if !current.has_id() {
            return ResourceResponse::default();
        }
        let (resource, ctx) = match self.prepare(type_name) {
            Ok(parts) => parts,
            Err(e) => return failure("read resource", &e),
        };

        let result = async {
            let _elapsed = log_elapsed(format!("resource.{}.read", type_name));
            resource.read(&ctx, &mut current).await
        }
        .instrument(ctx.span(type_name, "read"))
        .await;

        match result {
            Ok(()) if current.has_id() => ResourceResponse::with_state(current),
            Ok(()) => ResourceResponse::default(),
            Err(e) => failure("read resource", &e),
        }
    }

    pub async fn update(
        &self,
        type_name: &str,
        prior: &ResourceData,
        mut planned: ResourceData,
    ) -> ResourceResponse {
        let (resource, ctx) = match self.prepare(type_name) {
            Ok(parts) => parts,
            Err(e) => return failure("update resource", &e),
        };

        let schema = resource.schema();
        schema.apply_defaults(&mut planned);
        planned.set_id(prior.id());

        let diags = resource.validate(&planned);
        if diags.has_errors() {
            return ResourceResponse::from_diagnostics(diags);
        }

        let replace = schema.requires_replace(prior, &planned);
        if !replace.is_empty() {
            let mut diags = Diagnostics::new();
            for name in replace {
                diags.add_attribute_error(
                    &name,
                    "Attribute requires replacement",
                    format!("{} cannot be changed in place", name),
                );
            }
            return ResourceResponse::from_diagnostics(diags);
        }

        let result = async {
            let _elapsed = log_elapsed(format!("resource.{}.update", type_name));
            resource.update(&ctx, prior, &mut planned).await
        }
        .instrument(ctx.span(type_name, "update"))
        .await;

        match result {
            Ok(()) => ResourceResponse::with_state(planned),
            Err(e) => failure("update resource", &e),
        }
    }

    pub async fn delete(&self, type_name: &str, current: &ResourceData) -> Diagnostics {
        if !current.has_id() {
            return Diagnostics::new();
        }
        let (resource, ctx) = match self.prepare(type_name) {
            Ok(parts) => parts,
            Err(e) => return Diagnostic::from_error("delete resource", &e).into(),
        };

        let result = async {
            let _elapsed = log_elapsed(format!("resource.{}.delete", type_name));
            resource.delete(&ctx, current).await
        }
        .instrument(ctx.span(type_name, "delete"))
        .await;

        match result {
            Ok(()) => Diagnostics::new(),
            Err(e) => Diagnostic::from_error("delete resource", &e).into(),
        }
    }

    pub async fn import(&self, type_name: &str, id: &str) -> ResourceResponse {
        let (resource, ctx) = match self.prepare(type_name) {
            Ok(parts) => parts,
            Err(e) => return failure("import resource", &e),
        };

        let result = async {
            let _elapsed = log_elapsed(format!("resource.{}.import", type_name));
            resource.import(&ctx, id).await
        }
        .instrument(ctx.span(type_name, "import"))
        .await;

        match result {
            Ok(Some(state)) => ResourceResponse::with_state(state),
            Ok(None) => failure(
                "import resource",
                &ProviderError::State(format!("cannot import non-existent remote object {}", id)),
            ),
            Err(e) => failure("import resource", &e),
        }
    }
}

fn failure(operation: &str, error: &ProviderError) -> ResourceResponse {
    ResourceResponse::from_diagnostics(Diagnostic::from_error(operation, error).into())
}
