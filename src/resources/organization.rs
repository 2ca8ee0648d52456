use async_trait::async_trait;
use tracing::info;

use super::{found, with_timestamps, Resource};
use crate::api::{CreateOrgRequest, Organization, UpdateOrgRequest};
use crate::error::ProviderError;
use crate::provider::ProviderContext;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceState;

/// `pipes_organization`, identified by its handle.
pub struct OrganizationResource;

fn write_state(state: &mut ResourceState, org: Organization) {
    state
        .set("id", org.handle.clone())
        .set("handle", org.handle)
        .set("organization_id", org.id)
        .set_opt("display_name", org.display_name)
        .set_opt("url", org.url)
        .set_opt("avatar_url", org.avatar_url)
        .set_opt("created_at", org.created_at)
        .set_opt("updated_at", org.updated_at)
        .set_opt("version_id", org.version_id);
}

#[async_trait]
impl Resource for OrganizationResource {
    fn type_name(&self) -> &'static str {
        "pipes_organization"
    }

    fn schema(&self) -> Schema {
        with_timestamps(
            Schema::v0()
                .with_description("A Pipes organization.")
                .with_attribute("id", Attribute::computed_string())
                .with_attribute(
                    "handle",
                    Attribute::required_string().with_description("Unique handle of the organization."),
                )
                .with_attribute("display_name", Attribute::optional_computed_string())
                .with_attribute("url", Attribute::optional_computed_string())
                .with_attribute("avatar_url", Attribute::optional_computed_string())
                .with_attribute("organization_id", Attribute::computed_string()),
        )
    }

    async fn create(&self, ctx: &ProviderContext, mut planned: ResourceState) -> Result<ResourceState, ProviderError> {
        let request = CreateOrgRequest {
            handle: planned.require_str("handle")?.to_string(),
            display_name: planned.get_string("display_name"),
            url: planned.get_string("url"),
            avatar_url: planned.get_string("avatar_url"),
        };
        let org = ctx.client().create_org(&request).await?;
        info!(handle = %org.handle, id = %org.id, "Created organization");

        write_state(&mut planned, org);
        Ok(planned)
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        mut current: ResourceState,
    ) -> Result<Option<ResourceState>, ProviderError> {
        let handle = current.require_str("handle")?.to_string();
        let Some(org) = found(ctx.client().get_org(&handle).await)? else {
            return Ok(None);
        };
        write_state(&mut current, org);
        Ok(Some(current))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: ResourceState,
        mut planned: ResourceState,
    ) -> Result<ResourceState, ProviderError> {
        let changed = |key: &str| {
            if prior.differs(&planned, key) {
                planned.get_string(key)
            } else {
                None
            }
        };
        let request = UpdateOrgRequest {
            handle: changed("handle"),
            display_name: changed("display_name"),
            url: changed("url"),
            avatar_url: changed("avatar_url"),
        };

        let handle = prior.require_str("handle")?;
        let org = ctx.client().update_org(handle, &request).await?;
        info!(handle = %org.handle, "Updated organization");

        write_state(&mut planned, org);
        Ok(planned)
    }

    async fn delete(&self, ctx: &ProviderContext, current: ResourceState) -> Result<(), ProviderError> {
        let handle = current.require_str("handle")?;
        ctx.client().delete_org(handle).await?;
        info!(handle, "Deleted organization");
        Ok(())
    }

    async fn import_state(&self, _ctx: &ProviderContext, id: &str) -> Result<ResourceState, ProviderError> {
        let mut state = ResourceState::new();
        state.set("handle", id);
        Ok(state)
    }
}
