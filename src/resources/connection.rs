use async_trait::async_trait;
use tracing::info;

use super::{
    check_json_object, found, imported_state, organization_attribute, with_timestamps, write_owner, Resource,
};
use crate::api::{Connection, CreateConnectionRequest, UpdateConnectionRequest};
use crate::error::ProviderError;
use crate::owner::{compose_id, split_id, Owner};
use crate::provider::ProviderContext;
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::state::ResourceState;

/// `pipes_connection`: a plugin connection owned by a user or organization.
///
/// `config` is write-only. The API masks secrets in what it returns, so the
/// configured value is kept in state as-is.
pub struct ConnectionResource;

fn write_state(state: &mut ResourceState, owner: &Owner, connection: Connection) {
    write_owner(state, owner);
    state
        .set("id", compose_id(&[owner.handle(), &connection.handle]))
        .set("handle", connection.handle)
        .set("plugin", connection.plugin)
        .set("connection_id", connection.id)
        .set_opt("identity_id", connection.identity_id)
        .set_opt("type", connection.connection_type)
        .set_opt("created_at", connection.created_at)
        .set_opt("updated_at", connection.updated_at)
        .set_opt("version_id", connection.version_id);
}

#[async_trait]
impl Resource for ConnectionResource {
    fn type_name(&self) -> &'static str {
        "pipes_connection"
    }

    fn schema(&self) -> Schema {
        with_timestamps(
            Schema::v0()
                .with_description("A connection to a Steampipe plugin.")
                .with_attribute("id", Attribute::computed_string())
                .with_attribute("organization", organization_attribute())
                .with_attribute("handle", Attribute::required_string())
                .with_attribute(
                    "plugin",
                    Attribute::required_string()
                        .with_force_new()
                        .with_description("Plugin name, e.g. aws or turbot/aws."),
                )
                .with_attribute(
                    "config",
                    Attribute::optional_string()
                        .sensitive()
                        .with_description("JSON-encoded plugin configuration."),
                )
                .with_attribute("connection_id", Attribute::computed_string())
                .with_attribute("identity_id", Attribute::computed_string())
                .with_attribute("type", Attribute::computed_string()),
        )
    }

    fn validate(&self, config: &ResourceState) -> Vec<Diagnostic> {
        check_json_object(config, "config").into_iter().collect()
    }

    async fn create(&self, ctx: &ProviderContext, mut planned: ResourceState) -> Result<ResourceState, ProviderError> {
        let owner = ctx.resolve_owner(&planned).await?;
        let request = CreateConnectionRequest {
            handle: planned.require_str("handle")?.to_string(),
            plugin: planned.require_str("plugin")?.to_string(),
            config: planned.get_json_object("config")?,
        };

        let connection = ctx.client().create_connection(&owner, &request).await?;
        info!(owner = %owner, handle = %connection.handle, plugin = %connection.plugin, "Created connection");

        write_state(&mut planned, &owner, connection);
        Ok(planned)
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        mut current: ResourceState,
    ) -> Result<Option<ResourceState>, ProviderError> {
        let owner = ctx.resolve_owner(&current).await?;
        let handle = current.require_str("handle")?;
        let Some(connection) = found(ctx.client().get_connection(&owner, handle).await)? else {
            return Ok(None);
        };

        write_state(&mut current, &owner, connection);
        Ok(Some(current))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: ResourceState,
        mut planned: ResourceState,
    ) -> Result<ResourceState, ProviderError> {
        let owner = ctx.resolve_owner(&prior).await?;
        let mut request = UpdateConnectionRequest::default();
        if prior.differs(&planned, "handle") {
            request.handle = planned.get_string("handle");
        }
        if prior.differs(&planned, "config") {
            request.config = Some(planned.get_json_object("config")?.unwrap_or_default());
        }

        let handle = prior.require_str("handle")?;
        let connection = ctx.client().update_connection(&owner, handle, &request).await?;
        info!(owner = %owner, handle = %connection.handle, "Updated connection");

        write_state(&mut planned, &owner, connection);
        Ok(planned)
    }

    async fn delete(&self, ctx: &ProviderContext, current: ResourceState) -> Result<(), ProviderError> {
        let owner = ctx.resolve_owner(&current).await?;
        let handle = current.require_str("handle")?;
        ctx.client().delete_connection(&owner, handle).await?;
        info!(owner = %owner, handle, "Deleted connection");
        Ok(())
    }

    async fn import_state(&self, ctx: &ProviderContext, id: &str) -> Result<ResourceState, ProviderError> {
        let [owner, handle] = split_id::<2>(id, "{owner}/{connection_handle}")?;
        let owner = ctx.owner_for_handle(owner).await?;
        let mut state = imported_state(&owner, id);
        state.set("handle", handle);
        Ok(state)
    }
}
