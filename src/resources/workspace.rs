use async_trait::async_trait;
use tracing::{debug, info};

use super::{found, imported_state, organization_attribute, with_timestamps, write_owner, Resource};
use crate::api::{CreateWorkspaceRequest, UpdateWorkspaceRequest, Workspace};
use crate::error::ProviderError;
use crate::owner::{compose_id, split_id, Owner};
use crate::provider::ProviderContext;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceState;

/// `pipes_workspace`, owned by a user or an organization.
pub struct WorkspaceResource;

fn write_state(state: &mut ResourceState, owner: &Owner, workspace: Workspace) {
    write_owner(state, owner);
    state
        .set("id", compose_id(&[owner.handle(), &workspace.handle]))
        .set("handle", workspace.handle)
        .set("workspace_id", workspace.id)
        .set_opt("instance_type", workspace.instance_type)
        .set_opt("desired_state", workspace.desired_state)
        .set_opt("db_volume_size_bytes", workspace.db_volume_size_bytes)
        .set_opt("workspace_state", workspace.state)
        .set_opt("identity_id", workspace.identity_id)
        .set_opt("hive", workspace.hive)
        .set_opt("host", workspace.host)
        .set_opt("database_name", workspace.database_name)
        .set_opt("created_at", workspace.created_at)
        .set_opt("updated_at", workspace.updated_at)
        .set_opt("version_id", workspace.version_id);
}

#[async_trait]
impl Resource for WorkspaceResource {
    fn type_name(&self) -> &'static str {
        "pipes_workspace"
    }

    fn schema(&self) -> Schema {
        with_timestamps(
            Schema::v0()
                .with_description("A Pipes workspace.")
                .with_attribute("id", Attribute::computed_string())
                .with_attribute("organization", organization_attribute())
                .with_attribute(
                    "handle",
                    Attribute::required_string().with_description("Handle of the workspace, unique per owner."),
                )
                .with_attribute("instance_type", Attribute::optional_computed_string())
                .with_attribute(
                    "desired_state",
                    Attribute::optional_computed_string().with_description("Either enabled or disabled."),
                )
                .with_attribute("db_volume_size_bytes", Attribute::optional_computed_int64())
                .with_attribute("workspace_id", Attribute::computed_string())
                .with_attribute("workspace_state", Attribute::computed_string())
                .with_attribute("identity_id", Attribute::computed_string())
                .with_attribute("hive", Attribute::computed_string())
                .with_attribute("host", Attribute::computed_string())
                .with_attribute("database_name", Attribute::computed_string()),
        )
    }

    async fn create(&self, ctx: &ProviderContext, mut planned: ResourceState) -> Result<ResourceState, ProviderError> {
        let owner = ctx.resolve_owner(&planned).await?;
        let request = CreateWorkspaceRequest {
            handle: planned.require_str("handle")?.to_string(),
            instance_type: planned.get_string("instance_type"),
            desired_state: planned.get_string("desired_state"),
            db_volume_size_bytes: planned.get_i64("db_volume_size_bytes"),
        };

        let workspace = ctx.client().create_workspace(&owner, &request).await?;
        info!(owner = %owner, handle = %workspace.handle, id = %workspace.id, "Created workspace");

        write_state(&mut planned, &owner, workspace);
        Ok(planned)
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        mut current: ResourceState,
    ) -> Result<Option<ResourceState>, ProviderError> {
        let owner = ctx.resolve_owner(&current).await?;
        let handle = current.require_str("handle")?;
        let Some(workspace) = found(ctx.client().get_workspace(&owner, handle).await)? else {
            return Ok(None);
        };

        write_state(&mut current, &owner, workspace);
        Ok(Some(current))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: ResourceState,
        mut planned: ResourceState,
    ) -> Result<ResourceState, ProviderError> {
        let owner = ctx.resolve_owner(&prior).await?;
        let changed = |key: &str| prior.differs(&planned, key);
        let request = UpdateWorkspaceRequest {
            handle: changed("handle").then(|| planned.get_string("handle")).flatten(),
            instance_type: changed("instance_type")
                .then(|| planned.get_string("instance_type"))
                .flatten(),
            desired_state: changed("desired_state")
                .then(|| planned.get_string("desired_state"))
                .flatten(),
            db_volume_size_bytes: changed("db_volume_size_bytes")
                .then(|| planned.get_i64("db_volume_size_bytes"))
                .flatten(),
        };

        let current = prior.require_str("handle")?;
        let workspace = if request.is_empty() {
            debug!(owner = %owner, handle = current, "No workspace fields changed");
            ctx.client().get_workspace(&owner, current).await?
        } else {
            let workspace = ctx.client().update_workspace(&owner, current, &request).await?;
            info!(owner = %owner, handle = %workspace.handle, "Updated workspace");
            workspace
        };

        write_state(&mut planned, &owner, workspace);
        Ok(planned)
    }

    async fn delete(&self, ctx: &ProviderContext, current: ResourceState) -> Result<(), ProviderError> {
        let owner = ctx.resolve_owner(&current).await?;
        let handle = current.require_str("handle")?;
        ctx.client().delete_workspace(&owner, handle).await?;
        info!(owner = %owner, handle, "Deleted workspace");
        Ok(())
    }

    async fn import_state(&self, ctx: &ProviderContext, id: &str) -> Result<ResourceState, ProviderError> {
        let [owner, handle] = split_id::<2>(id, "{owner}/{workspace_handle}")?;
        let owner = ctx.owner_for_handle(owner).await?;
        let mut state = imported_state(&owner, id);
        state.set("handle", handle);
        Ok(state)
    }
}
