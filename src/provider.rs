//! The Pipes provider: a registry of resources and data sources behind
//! [`ProviderService`].
//!
//! Schema validation and planning are generic. Only the CRUD handlers are
//! resource specific, and they all receive the [`ProviderContext`] built by
//! `configure`.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info};

use crate::api::{PipesClient, User};
use crate::config::ProviderConfig;
use crate::data_sources::{self, DataSource};
use crate::error::ProviderError;
use crate::owner::Owner;
use crate::plan::plan_change;
use crate::resources::{self, Resource};
use crate::retry::RetryPolicy;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::server::ProviderService;
use crate::state::ResourceState;
use crate::types::{ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities};
use crate::validation;

/// Runtime state shared by every handler once the provider is configured.
pub struct ProviderContext {
    client: PipesClient,
    config: ProviderConfig,
    actor: OnceCell<User>,
    retry_policy: RetryPolicy,
}

impl ProviderContext {
    /// Context for a freshly configured provider; the actor is fetched lazily.
    pub fn new(client: PipesClient, config: ProviderConfig, retry_policy: RetryPolicy) -> Self {
        Self {
            client,
            config,
            actor: OnceCell::new(),
            retry_policy,
        }
    }

    /// API client authenticated with the configured token.
    pub fn client(&self) -> &PipesClient {
        &self.client
    }

    /// Provider configuration after environment fallbacks.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Policy for creates that wait on eventually consistent API objects.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// The authenticated user, fetched on first use.
    pub async fn actor(&self) -> Result<&User, ProviderError> {
        self.actor
            .get_or_try_init(|| async {
                let actor = self.client.get_actor().await?;
                debug!(handle = %actor.handle, "Resolved actor");
                Ok::<_, ProviderError>(actor)
            })
            .await
    }

    /// Owner of a workspace-level resource.
    ///
    /// An `organization` attribute names the owner. Without one, an object
    /// that already has an `id` belongs to the user in its first segment, and
    /// a new object goes to the provider organization, then the actor.
    pub async fn resolve_owner(&self, state: &ResourceState) -> Result<Owner, ProviderError> {
        if let Some(org) = state.get_str("organization") {
            return Ok(Owner::Org(org.to_string()));
        }
        let recorded = state
            .get_str("id")
            .and_then(|id| id.split('/').next())
            .filter(|handle| !handle.is_empty());
        if let Some(user) = recorded {
            return Ok(Owner::User(user.to_string()));
        }
        if let Some(org) = self.config.organization.as_deref().filter(|o| !o.is_empty()) {
            return Ok(Owner::Org(org.to_string()));
        }
        Ok(Owner::User(self.actor().await?.handle.clone()))
    }

    /// Owner for the first segment of an imported ID.
    pub async fn owner_for_handle(&self, handle: &str) -> Result<Owner, ProviderError> {
        let actor = self.actor().await?;
        Ok(Owner::from_id_segment(handle, &actor.handle))
    }
}

/// The provider served by the `pipes-provider` binary.
pub struct PipesProvider {
    resources: HashMap<&'static str, Box<dyn Resource>>,
    data_sources: HashMap<&'static str, Box<dyn DataSource>>,
    retry_policy: RetryPolicy,
    context: RwLock<Option<Arc<ProviderContext>>>,
}

impl PipesProvider {
    /// Provider with every resource and data source and the default retry policy.
    pub fn new() -> Self {
        Self::with_retry_policy(RetryPolicy::default())
    }

    /// Use a custom retry policy for eventually consistent creates.
    pub fn with_retry_policy(retry_policy: RetryPolicy) -> Self {
        Self {
            resources: resources::all()
                .into_iter()
                .map(|r| (r.type_name(), r))
                .collect(),
            data_sources: data_sources::all()
                .into_iter()
                .map(|d| (d.type_name(), d))
                .collect(),
            retry_policy,
            context: RwLock::new(None),
        }
    }

    fn resource(&self, resource_type: &str) -> Result<&dyn Resource, ProviderError> {
        self.resources
            .get(resource_type)
            .map(|r| r.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    fn data_source(&self, data_source_type: &str) -> Result<&dyn DataSource, ProviderError> {
        self.data_sources
            .get(data_source_type)
            .map(|d| d.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(data_source_type.to_string()))
    }

    async fn context(&self) -> Result<Arc<ProviderContext>, ProviderError> {
        self.context.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration("the provider has not been configured".to_string())
        })
    }
}

impl Default for PipesProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ProviderService for PipesProvider {
    fn schema(&self) -> ProviderSchema {
        let schema = ProviderSchema::new().with_provider_config(ProviderConfig::schema());
        let schema = self
            .resources
            .values()
            .fold(schema, |s, r| s.with_resource(r.type_name(), r.schema()));
        self.data_sources
            .values()
            .fold(schema, |s, d| s.with_data_source(d.type_name(), d.schema()))
    }

    fn metadata(&self) -> ProviderMetadata {
        let mut resources: Vec<String> = self.resources.keys().map(|k| k.to_string()).collect();
        let mut data_sources: Vec<String> = self.data_sources.keys().map(|k| k.to_string()).collect();
        resources.sort();
        data_sources.sort();
        ProviderMetadata {
            resources,
            data_sources,
            capabilities: ServerCapabilities { plan_destroy: true },
        }
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validation::validate(&ProviderConfig::schema(), &config))
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let config = match ProviderConfig::from_value(&config) {
            Ok(config) => config,
            Err(e) => {
                return Ok(vec![Diagnostic::error(e.message().to_string()).with_attribute("token")]);
            },
        };
        let client = PipesClient::new(&config)?;
        info!(
            base_url = %client.base_url(),
            organization = config.organization.as_deref().unwrap_or(""),
            "Provider configured"
        );

        let context = ProviderContext::new(client, config, self.retry_policy);
        *self.context.write().await = Some(Arc::new(context));
        Ok(vec![])
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let resource = self.resource(resource_type)?;
        let mut diagnostics = validation::validate(&resource.schema(), &config);
        diagnostics.extend(resource.validate(&ResourceState::from_value(config)?));
        Ok(diagnostics)
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let resource = self.resource(resource_type)?;
        plan_change(&resource.schema(), prior_state, proposed_state)
    }

    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let ctx = self.context().await?;
        let state = resource
            .create(&ctx, ResourceState::from_value(planned_state)?)
            .await?;
        Ok(state.into_value())
    }

    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Option<Value>, ProviderError> {
        let resource = self.resource(resource_type)?;
        let ctx = self.context().await?;
        let state = resource
            .read(&ctx, ResourceState::from_value(current_state)?)
            .await?;
        if state.is_none() {
            info!(resource_type, "Remote object no longer exists");
        }
        Ok(state.map(ResourceState::into_value))
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let ctx = self.context().await?;
        let state = resource
            .update(
                &ctx,
                ResourceState::from_value(prior_state)?,
                ResourceState::from_value(planned_state)?,
            )
            .await?;
        Ok(state.into_value())
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let resource = self.resource(resource_type)?;
        let ctx = self.context().await?;
        resource
            .delete(&ctx, ResourceState::from_value(current_state)?)
            .await
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let resource = self.resource(resource_type)?;
        let ctx = self.context().await?;
        let identity = resource.import_state(&ctx, id).await?;
        let state = resource.read(&ctx, identity).await?.ok_or_else(|| {
            ProviderError::NotFound(format!("{} '{}' does not exist", resource_type, id))
        })?;
        Ok(vec![ImportedResource::new(resource_type, state.into_value())])
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let data_source = self.data_source(data_source_type)?;
        Ok(validation::validate(&data_source.schema(), &config))
    }

    async fn read_data_source(&self, data_source_type: &str, config: Value) -> Result<Value, ProviderError> {
        let data_source = self.data_source(data_source_type)?;
        let ctx = self.context().await?;
        let state = data_source
            .read(&ctx, ResourceState::from_value(config)?)
            .await?;
        Ok(state.into_value())
    }
}
