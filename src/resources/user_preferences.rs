use async_trait::async_trait;
use tracing::{info, warn};

use super::{check_one_of, found, with_timestamps, Resource};
use crate::api::{UpdateUserPreferencesRequest, UserPreferences};
use crate::error::ProviderError;
use crate::provider::ProviderContext;
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::state::ResourceState;

const SETTINGS: &[&str] = &["enabled", "disabled"];

const PREFERENCES: &[&str] = &[
    "communication_community_updates",
    "communication_product_updates",
    "communication_tips_and_tricks",
];

/// `pipes_user_preferences`: communication preferences of the authenticated user.
///
/// Preferences always exist, so create and update both patch them and
/// delete only forgets the resource.
pub struct UserPreferencesResource;

fn request(planned: &ResourceState) -> UpdateUserPreferencesRequest {
    UpdateUserPreferencesRequest {
        communication_community_updates: planned.get_string("communication_community_updates"),
        communication_product_updates: planned.get_string("communication_product_updates"),
        communication_tips_and_tricks: planned.get_string("communication_tips_and_tricks"),
    }
}

fn write_state(state: &mut ResourceState, handle: &str, preferences: UserPreferences) {
    state
        .set("id", handle)
        .set("preferences_id", preferences.id)
        .set_opt("communication_community_updates", preferences.communication_community_updates)
        .set_opt("communication_product_updates", preferences.communication_product_updates)
        .set_opt("communication_tips_and_tricks", preferences.communication_tips_and_tricks)
        .set_opt("created_at", preferences.created_at)
        .set_opt("updated_at", preferences.updated_at)
        .set_opt("version_id", preferences.version_id);
}

impl UserPreferencesResource {
    async fn apply(&self, ctx: &ProviderContext, mut planned: ResourceState) -> Result<ResourceState, ProviderError> {
        let handle = ctx.actor().await?.handle.clone();
        let preferences = ctx
            .client()
            .update_user_preferences(&handle, &request(&planned))
            .await?;
        info!(user = %handle, "Updated user preferences");

        write_state(&mut planned, &handle, preferences);
        Ok(planned)
    }
}

#[async_trait]
impl Resource for UserPreferencesResource {
    fn type_name(&self) -> &'static str {
        "pipes_user_preferences"
    }

    fn schema(&self) -> Schema {
        let schema = Schema::v0()
            .with_description("Communication preferences of the authenticated user.")
            .with_attribute("id", Attribute::computed_string())
            .with_attribute("preferences_id", Attribute::computed_string());
        let schema = PREFERENCES.iter().fold(schema, |schema, name| {
            schema.with_attribute(
                *name,
                Attribute::optional_computed_string().with_description("Either enabled or disabled."),
            )
        });
        with_timestamps(schema)
    }

    fn validate(&self, config: &ResourceState) -> Vec<Diagnostic> {
        PREFERENCES
            .iter()
            .filter_map(|name| check_one_of(config, name, SETTINGS))
            .collect()
    }

    async fn create(&self, ctx: &ProviderContext, planned: ResourceState) -> Result<ResourceState, ProviderError> {
        self.apply(ctx, planned).await
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        mut current: ResourceState,
    ) -> Result<Option<ResourceState>, ProviderError> {
        let handle = ctx.actor().await?.handle.clone();
        let Some(preferences) = found(ctx.client().get_user_preferences(&handle).await)? else {
            return Ok(None);
        };

        write_state(&mut current, &handle, preferences);
        Ok(Some(current))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        _prior: ResourceState,
        planned: ResourceState,
    ) -> Result<ResourceState, ProviderError> {
        self.apply(ctx, planned).await
    }

    async fn delete(&self, _ctx: &ProviderContext, current: ResourceState) -> Result<(), ProviderError> {
        warn!(
            user = current.get_str("id").unwrap_or_default(),
            "User preferences cannot be deleted; removing them from state only"
        );
        Ok(())
    }

    async fn import_state(&self, ctx: &ProviderContext, id: &str) -> Result<ResourceState, ProviderError> {
        let actor = ctx.actor().await?;
        if id != actor.handle {
            return Err(ProviderError::Validation(format!(
                "only the preferences of the authenticated user ({}) can be imported, got '{}'",
                actor.handle, id
            )));
        }
        let mut state = ResourceState::new();
        state.set("id", id);
        Ok(state)
    }
}
