use async_trait::async_trait;

use super::DataSource;
use crate::error::ProviderError;
use crate::provider::ProviderContext;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceState;

/// `pipes_user`: the user the API token belongs to.
pub struct UserDataSource;

#[async_trait]
impl DataSource for UserDataSource {
    fn type_name(&self) -> &'static str {
        "pipes_user"
    }

    fn schema(&self) -> Schema {
        [
            "id",
            "user_id",
            "handle",
            "display_name",
            "email",
            "status",
            "avatar_url",
            "url",
            "created_at",
            "updated_at",
        ]
        .into_iter()
        .fold(
            Schema::v0().with_description("The authenticated user."),
            |schema, name| schema.with_attribute(name, Attribute::computed_string()),
        )
        .with_attribute("version_id", Attribute::computed_int64())
    }

    async fn read(&self, ctx: &ProviderContext, mut config: ResourceState) -> Result<ResourceState, ProviderError> {
        let actor = ctx.actor().await?.clone();
        config
            .set("id", actor.handle.clone())
            .set("user_id", actor.id)
            .set("handle", actor.handle)
            .set_opt("display_name", actor.display_name)
            .set_opt("email", actor.email)
            .set_opt("status", actor.status)
            .set_opt("avatar_url", actor.avatar_url)
            .set_opt("url", actor.url)
            .set_opt("created_at", actor.created_at)
            .set_opt("updated_at", actor.updated_at)
            .set_opt("version_id", actor.version_id);
        Ok(config)
    }
}
