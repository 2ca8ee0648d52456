use async_trait::async_trait;
use tracing::info;

use super::{
    check_json_object, check_one_of, found, imported_state, organization_attribute, refresh_json, with_timestamps, write_owner, Resource,
};
use crate::api::{CreateSnapshotRequest, Snapshot, UpdateSnapshotRequest};
use crate::error::ProviderError;
use crate::owner::{compose_id, split_id, Owner};
use crate::provider::ProviderContext;
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::state::ResourceState;

const VISIBILITIES: &[&str] = &["workspace", "anyone_with_link"];

/// `pipes_workspace_snapshot`: an uploaded dashboard snapshot.
///
/// The snapshot document is only sent on create; the API does not return it.
pub struct WorkspaceSnapshotResource;

fn write_state(state: &mut ResourceState, owner: &Owner, workspace: &str, snapshot: Snapshot) {
    write_owner(state, owner);
    refresh_json(state, "tags", snapshot.tags.as_ref());
    state
        .set("id", compose_id(&[owner.handle(), workspace, &snapshot.id]))
        .set("workspace_handle", workspace)
        .set("snapshot_id", snapshot.id)
        .set_opt("visibility", snapshot.visibility)
        .set_opt("title", snapshot.title)
        .set_opt("dashboard_name", snapshot.dashboard_name)
        .set_opt("dashboard_title", snapshot.dashboard_title)
        .set_opt("schema_version", snapshot.schema_version)
        .set_opt("state", snapshot.state)
        .set_opt("workspace_id", snapshot.workspace_id)
        .set_opt("identity_id", snapshot.identity_id)
        .set_opt("created_at", snapshot.created_at)
        .set_opt("updated_at", snapshot.updated_at)
        .set_opt("version_id", snapshot.version_id);
}

#[async_trait]
impl Resource for WorkspaceSnapshotResource {
    fn type_name(&self) -> &'static str {
        "pipes_workspace_snapshot"
    }

    fn schema(&self) -> Schema {
        with_timestamps(
            Schema::v0()
                .with_description("A dashboard snapshot uploaded to a workspace.")
                .with_attribute("id", Attribute::computed_string())
                .with_attribute("organization", organization_attribute())
                .with_attribute("workspace_handle", Attribute::required_string().with_force_new())
                .with_attribute(
                    "data",
                    Attribute::required_string()
                        .with_force_new()
                        .with_description("JSON-encoded snapshot document."),
                )
                .with_attribute(
                    "visibility",
                    Attribute::optional_computed_string()
                        .with_description("Either workspace or anyone_with_link."),
                )
                .with_attribute(
                    "tags",
                    Attribute::optional_string().with_description("JSON-encoded tags."),
                )
                .with_attribute("snapshot_id", Attribute::computed_string())
                .with_attribute("title", Attribute::computed_string())
                .with_attribute("dashboard_name", Attribute::computed_string())
                .with_attribute("dashboard_title", Attribute::computed_string())
                .with_attribute("schema_version", Attribute::computed_string())
                .with_attribute("state", Attribute::computed_string())
                .with_attribute("workspace_id", Attribute::computed_string())
                .with_attribute("identity_id", Attribute::computed_string()),
        )
    }

    fn validate(&self, config: &ResourceState) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = check_one_of(config, "visibility", VISIBILITIES)
            .into_iter()
            .collect();
        if let Err(e) = config.get_json("data") {
            diagnostics.push(Diagnostic::error(e.message().to_string()).with_attribute("data"));
        }
        diagnostics.extend(check_json_object(config, "tags"));
        diagnostics
    }

    async fn create(&self, ctx: &ProviderContext, mut planned: ResourceState) -> Result<ResourceState, ProviderError> {
        let owner = ctx.resolve_owner(&planned).await?;
        let workspace = planned.require_str("workspace_handle")?.to_string();
        let data = planned
            .get_json("data")?
            .ok_or_else(|| ProviderError::Validation("attribute 'data' must be set".to_string()))?;
        let request = CreateSnapshotRequest {
            data,
            visibility: planned.get_string("visibility"),
            tags: planned.get_json_object("tags")?,
        };

        let snapshot = ctx
            .client()
            .create_snapshot(&owner, &workspace, &request)
            .await?;
        info!(owner = %owner, workspace = %workspace, id = %snapshot.id, "Uploaded snapshot");

        write_state(&mut planned, &owner, &workspace, snapshot);
        Ok(planned)
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        mut current: ResourceState,
    ) -> Result<Option<ResourceState>, ProviderError> {
        let owner = ctx.resolve_owner(&current).await?;
        let workspace = current.require_str("workspace_handle")?.to_string();
        let id = current.require_str("snapshot_id")?;
        let Some(snapshot) = found(ctx.client().get_snapshot(&owner, &workspace, id).await)? else {
            return Ok(None);
        };

        write_state(&mut current, &owner, &workspace, snapshot);
        Ok(Some(current))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: ResourceState,
        mut planned: ResourceState,
    ) -> Result<ResourceState, ProviderError> {
        let owner = ctx.resolve_owner(&prior).await?;
        let workspace = prior.require_str("workspace_handle")?;
        let id = prior.require_str("snapshot_id")?;

        let mut request = UpdateSnapshotRequest::default();
        if prior.differs(&planned, "visibility") {
            request.visibility = planned.get_string("visibility");
        }
        if prior.differs(&planned, "tags") {
            request.tags = Some(planned.get_json_object("tags")?.unwrap_or_default());
        }

        let snapshot = ctx
            .client()
            .update_snapshot(&owner, workspace, id, &request)
            .await?;
        info!(owner = %owner, workspace, id, "Updated snapshot");

        write_state(&mut planned, &owner, workspace, snapshot);
        Ok(planned)
    }

    async fn delete(&self, ctx: &ProviderContext, current: ResourceState) -> Result<(), ProviderError> {
        let owner = ctx.resolve_owner(&current).await?;
        let workspace = current.require_str("workspace_handle")?;
        let id = current.require_str("snapshot_id")?;
        ctx.client().delete_snapshot(&owner, workspace, id).await?;
        info!(owner = %owner, workspace, id, "Deleted snapshot");
        Ok(())
    }

    /// The snapshot document cannot be read back, so an imported snapshot
    /// has no `data` until the configuration supplies it.
    async fn import_state(&self, ctx: &ProviderContext, id: &str) -> Result<ResourceState, ProviderError> {
        let [owner, workspace, snapshot_id] = split_id::<3>(id, "{owner}/{workspace_handle}/{snapshot_id}")?;
        let owner = ctx.owner_for_handle(owner).await?;
        let mut state = imported_state(&owner, id);
        state
            .set("workspace_handle", workspace)
            .set("snapshot_id", snapshot_id);
        Ok(state)
    }
}
