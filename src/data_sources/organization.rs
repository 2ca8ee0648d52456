use async_trait::async_trait;
use tracing::debug;

use super::DataSource;
use crate::error::ProviderError;
use crate::provider::ProviderContext;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceState;

/// `pipes_organization`: look up an organization by handle.
pub struct OrganizationDataSource;

#[async_trait]
impl DataSource for OrganizationDataSource {
    fn type_name(&self) -> &'static str {
        "pipes_organization"
    }

    fn schema(&self) -> Schema {
        Schema::v0()
            .with_description("An organization the authenticated user can see.")
            .with_attribute("handle", Attribute::required_string())
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("organization_id", Attribute::computed_string())
            .with_attribute("display_name", Attribute::computed_string())
            .with_attribute("url", Attribute::computed_string())
            .with_attribute("avatar_url", Attribute::computed_string())
            .with_attribute("created_at", Attribute::computed_string())
            .with_attribute("updated_at", Attribute::computed_string())
            .with_attribute("version_id", Attribute::computed_int64())
    }

    async fn read(&self, ctx: &ProviderContext, mut config: ResourceState) -> Result<ResourceState, ProviderError> {
        let handle = config.require_str("handle")?.to_string();
        let org = ctx.client().get_org(&handle).await?;
        debug!(handle = %org.handle, id = %org.id, "Read organization");

        config
            .set("id", org.handle.clone())
            .set("handle", org.handle)
            .set("organization_id", org.id)
            .set_opt("display_name", org.display_name)
            .set_opt("url", org.url)
            .set_opt("avatar_url", org.avatar_url)
            .set_opt("created_at", org.created_at)
            .set_opt("updated_at", org.updated_at)
            .set_opt("version_id", org.version_id);
        Ok(config)
    }
}
