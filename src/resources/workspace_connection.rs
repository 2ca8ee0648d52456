use async_trait::async_trait;
use tracing::info;

use super::{found, imported_state, organization_attribute, with_timestamps, write_owner, Resource};
use crate::api::{ApiError, CreateWorkspaceConnectionRequest, WorkspaceConnection};
use crate::error::ProviderError;
use crate::owner::{compose_id, split_id, Owner};
use crate::provider::ProviderContext;
use crate::retry::retry_until_success;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceState;

/// `pipes_workspace_connection`: attaches a connection to a workspace.
///
/// A freshly created workspace or connection is not always visible to the
/// association endpoint straight away, so create retries on 404, 409, 429
/// and server errors.
pub struct WorkspaceConnectionResource;

fn write_state(
    state: &mut ResourceState,
    owner: &Owner,
    workspace: &str,
    connection: &str,
    association: WorkspaceConnection,
) {
    write_owner(state, owner);
    state
        .set("id", compose_id(&[owner.handle(), workspace, connection]))
        .set("workspace_handle", workspace)
        .set("connection_handle", connection)
        .set("association_id", association.id)
        .set("workspace_id", association.workspace_id)
        .set("connection_id", association.connection_id)
        .set_opt("identity_id", association.identity_id)
        .set_opt("created_at", association.created_at)
        .set_opt("updated_at", association.updated_at)
        .set_opt("version_id", association.version_id);
}

#[async_trait]
impl Resource for WorkspaceConnectionResource {
    fn type_name(&self) -> &'static str {
        "pipes_workspace_connection"
    }

    fn schema(&self) -> Schema {
        with_timestamps(
            Schema::v0()
                .with_description("Association between a workspace and a connection.")
                .with_attribute("id", Attribute::computed_string())
                .with_attribute("organization", organization_attribute())
                .with_attribute("workspace_handle", Attribute::required_string().with_force_new())
                .with_attribute("connection_handle", Attribute::required_string().with_force_new())
                .with_attribute("association_id", Attribute::computed_string())
                .with_attribute("workspace_id", Attribute::computed_string())
                .with_attribute("connection_id", Attribute::computed_string())
                .with_attribute("identity_id", Attribute::computed_string()),
        )
    }

    async fn create(&self, ctx: &ProviderContext, mut planned: ResourceState) -> Result<ResourceState, ProviderError> {
        let owner = ctx.resolve_owner(&planned).await?;
        let workspace = planned.require_str("workspace_handle")?.to_string();
        let connection = planned.require_str("connection_handle")?.to_string();
        let request = CreateWorkspaceConnectionRequest {
            connection_handle: connection.clone(),
        };

        let client = ctx.client();
        let association = retry_until_success(
            ctx.retry_policy(),
            "create workspace connection",
            || client.create_workspace_connection(&owner, &workspace, &request),
            ApiError::is_retryable,
        )
        .await?;
        info!(owner = %owner, workspace = %workspace, connection = %connection, "Attached connection to workspace");

        write_state(&mut planned, &owner, &workspace, &connection, association);
        Ok(planned)
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        mut current: ResourceState,
    ) -> Result<Option<ResourceState>, ProviderError> {
        let owner = ctx.resolve_owner(&current).await?;
        let workspace = current.require_str("workspace_handle")?.to_string();
        let connection = current.require_str("connection_handle")?.to_string();
        let result = ctx
            .client()
            .get_workspace_connection(&owner, &workspace, &connection)
            .await;
        let Some(association) = found(result)? else {
            return Ok(None);
        };

        write_state(&mut current, &owner, &workspace, &connection, association);
        Ok(Some(current))
    }

    /// Every configurable attribute forces replacement, so there is nothing to
    /// send; refresh the computed attributes instead.
    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: ResourceState,
        planned: ResourceState,
    ) -> Result<ResourceState, ProviderError> {
        self.read(ctx, planned).await?.ok_or_else(|| {
            ProviderError::NotFound("workspace connection no longer exists".to_string())
        })
    }

    async fn delete(&self, ctx: &ProviderContext, current: ResourceState) -> Result<(), ProviderError> {
        let owner = ctx.resolve_owner(&current).await?;
        let workspace = current.require_str("workspace_handle")?;
        let connection = current.require_str("connection_handle")?;
        ctx.client()
            .delete_workspace_connection(&owner, workspace, connection)
            .await?;
        info!(owner = %owner, workspace, connection, "Detached connection from workspace");
        Ok(())
    }

    async fn import_state(&self, ctx: &ProviderContext, id: &str) -> Result<ResourceState, ProviderError> {
        let [owner, workspace, connection] =
            split_id::<3>(id, "{owner}/{workspace_handle}/{connection_handle}")?;
        let owner = ctx.owner_for_handle(owner).await?;
        let mut state = imported_state(&owner, id);
        state
            .set("workspace_handle", workspace)
            .set("connection_handle", connection);
        Ok(state)
    }
}
