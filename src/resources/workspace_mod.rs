use async_trait::async_trait;
use tracing::info;

use super::{found, imported_state, organization_attribute, with_timestamps, write_owner, Resource};
use crate::api::{CreateWorkspaceModRequest, UpdateWorkspaceModRequest, WorkspaceMod};
use crate::error::ProviderError;
use crate::owner::{compose_id, split_id, Owner};
use crate::provider::ProviderContext;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceState;

/// `pipes_workspace_mod`: a mod installed into a workspace.
pub struct WorkspaceModResource;

fn write_state(state: &mut ResourceState, owner: &Owner, workspace: &str, installed: WorkspaceMod) {
    write_owner(state, owner);
    state
        .set("id", compose_id(&[owner.handle(), workspace, &installed.alias]))
        .set("workspace_handle", workspace)
        .set("path", installed.path)
        .set("mod_alias", installed.alias)
        .set("workspace_mod_id", installed.id)
        .set_opt("constraint", installed.constraint)
        .set_opt("installed_version", installed.installed_version)
        .set_opt("state", installed.state)
        .set_opt("workspace_id", installed.workspace_id)
        .set_opt("identity_id", installed.identity_id)
        .set_opt("created_at", installed.created_at)
        .set_opt("updated_at", installed.updated_at)
        .set_opt("version_id", installed.version_id);
}

#[async_trait]
impl Resource for WorkspaceModResource {
    fn type_name(&self) -> &'static str {
        "pipes_workspace_mod"
    }

    fn schema(&self) -> Schema {
        with_timestamps(
            Schema::v0()
                .with_description("A mod installed in a workspace.")
                .with_attribute("id", Attribute::computed_string())
                .with_attribute("organization", organization_attribute())
                .with_attribute("workspace_handle", Attribute::required_string().with_force_new())
                .with_attribute(
                    "path",
                    Attribute::required_string()
                        .with_force_new()
                        .with_description("Repository path of the mod, e.g. github.com/turbot/steampipe-mod-aws-compliance."),
                )
                .with_attribute(
                    "constraint",
                    Attribute::optional_computed_string().with_description("Version constraint, e.g. ^0.60."),
                )
                .with_attribute("mod_alias", Attribute::computed_string())
                .with_attribute("workspace_mod_id", Attribute::computed_string())
                .with_attribute("workspace_id", Attribute::computed_string())
                .with_attribute("identity_id", Attribute::computed_string())
                .with_attribute("installed_version", Attribute::computed_string())
                .with_attribute("state", Attribute::computed_string()),
        )
    }

    async fn create(&self, ctx: &ProviderContext, mut planned: ResourceState) -> Result<ResourceState, ProviderError> {
        let owner = ctx.resolve_owner(&planned).await?;
        let workspace = planned.require_str("workspace_handle")?.to_string();
        let request = CreateWorkspaceModRequest {
            path: planned.require_str("path")?.to_string(),
            constraint: planned.get_string("constraint"),
        };

        let installed = ctx
            .client()
            .install_workspace_mod(&owner, &workspace, &request)
            .await?;
        info!(
            owner = %owner,
            workspace = %workspace,
            alias = %installed.alias,
            path = %installed.path,
            "Installed workspace mod"
        );

        write_state(&mut planned, &owner, &workspace, installed);
        Ok(planned)
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        mut current: ResourceState,
    ) -> Result<Option<ResourceState>, ProviderError> {
        let owner = ctx.resolve_owner(&current).await?;
        let workspace = current.require_str("workspace_handle")?.to_string();
        let alias = current.require_str("mod_alias")?;
        let result = ctx.client().get_workspace_mod(&owner, &workspace, alias).await;
        let Some(installed) = found(result)? else {
            return Ok(None);
        };

        write_state(&mut current, &owner, &workspace, installed);
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
        let alias = prior.require_str("mod_alias")?;

        let installed = match planned.get_string("constraint") {
            Some(constraint) if prior.differs(&planned, "constraint") => {
                let request = UpdateWorkspaceModRequest { constraint };
                let installed = ctx
                    .client()
                    .update_workspace_mod(&owner, workspace, alias, &request)
                    .await?;
                info!(owner = %owner, workspace, alias, constraint = %request.constraint, "Updated workspace mod");
                installed
            },
            _ => ctx.client().get_workspace_mod(&owner, workspace, alias).await?,
        };

        write_state(&mut planned, &owner, workspace, installed);
        Ok(planned)
    }

    async fn delete(&self, ctx: &ProviderContext, current: ResourceState) -> Result<(), ProviderError> {
        let owner = ctx.resolve_owner(&current).await?;
        let workspace = current.require_str("workspace_handle")?;
        let alias = current.require_str("mod_alias")?;
        ctx.client()
            .uninstall_workspace_mod(&owner, workspace, alias)
            .await?;
        info!(owner = %owner, workspace, alias, "Uninstalled workspace mod");
        Ok(())
    }

    async fn import_state(&self, ctx: &ProviderContext, id: &str) -> Result<ResourceState, ProviderError> {
        let [owner, workspace, alias] = split_id::<3>(id, "{owner}/{workspace_handle}/{mod_alias}")?;
        let owner = ctx.owner_for_handle(owner).await?;
        let mut state = imported_state(&owner, id);
        state.set("workspace_handle", workspace).set("mod_alias", alias);
        Ok(state)
    }
}
