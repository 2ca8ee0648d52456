//! Resource handlers, one per managed object type.
//!
//! A handler only maps between state attributes and API calls. Validation
//! against the schema and planning happen generically in the provider.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::api::ApiError;
use crate::error::ProviderError;
use crate::owner::Owner;
use crate::provider::ProviderContext;
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::state::ResourceState;

mod connection;
mod organization;
mod organization_member;
mod user_preferences;
mod workspace;
mod workspace_connection;
mod workspace_mod;
mod workspace_mod_variable;
mod workspace_pipeline;
mod workspace_snapshot;

pub use connection::ConnectionResource;
pub use organization::OrganizationResource;
pub use organization_member::OrganizationMemberResource;
pub use user_preferences::UserPreferencesResource;
pub use workspace::WorkspaceResource;
pub use workspace_connection::WorkspaceConnectionResource;
pub use workspace_mod::WorkspaceModResource;
pub use workspace_mod_variable::WorkspaceModVariableResource;
pub use workspace_pipeline::WorkspacePipelineResource;
pub use workspace_snapshot::WorkspaceSnapshotResource;

/// CRUD handler for one resource type.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name used in configuration, e.g. `pipes_workspace`.
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Checks beyond what the schema can express.
    fn validate(&self, _config: &ResourceState) -> Vec<Diagnostic> {
        vec![]
    }

    async fn create(&self, ctx: &ProviderContext, planned: ResourceState) -> Result<ResourceState, ProviderError>;

    /// Refresh from the API. `None` when the object no longer exists.
    async fn read(
        &self,
        ctx: &ProviderContext,
        current: ResourceState,
    ) -> Result<Option<ResourceState>, ProviderError>;

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: ResourceState,
        planned: ResourceState,
    ) -> Result<ResourceState, ProviderError>;

    async fn delete(&self, ctx: &ProviderContext, current: ResourceState) -> Result<(), ProviderError>;

    /// Build the identifying attributes for an imported ID; the provider reads
    /// the rest.
    async fn import_state(&self, ctx: &ProviderContext, id: &str) -> Result<ResourceState, ProviderError>;
}

/// Every resource the provider serves.
pub fn all() -> Vec<Box<dyn Resource>> {
    vec![
        Box::new(OrganizationResource),
        Box::new(OrganizationMemberResource),
        Box::new(WorkspaceResource),
        Box::new(ConnectionResource),
        Box::new(WorkspaceConnectionResource),
        Box::new(WorkspaceModResource),
        Box::new(WorkspaceModVariableResource),
        Box::new(WorkspacePipelineResource),
        Box::new(WorkspaceSnapshotResource),
        Box::new(UserPreferencesResource),
    ]
}

/// Map a 404 to `None` so reads can report the object as gone.
pub(crate) fn found<T>(result: Result<T, ApiError>) -> Result<Option<T>, ProviderError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write the owner back: the organization handle, or null for the user.
pub(crate) fn write_owner(state: &mut ResourceState, owner: &Owner) {
    state.set_opt("organization", owner.organization());
}

/// Identifying state for an imported ID: the owner and the ID itself, so
/// reads keep addressing the owner the ID names.
pub(crate) fn imported_state(owner: &Owner, id: &str) -> ResourceState {
    let mut state = ResourceState::new();
    write_owner(&mut state, owner);
    state.set("id", id);
    state
}

/// Refresh a JSON-encoded object attribute, keeping the configured text when
/// it already describes the remote value.
pub(crate) fn refresh_json(
    state: &mut ResourceState,
    key: &str,
    remote: Option<&Map<String, Value>>,
) {
    // An empty object and an absent one are the same remotely.
    let current = state
        .get_json_object(key)
        .ok()
        .flatten()
        .filter(|m| !m.is_empty());
    let remote = remote.filter(|m| !m.is_empty());
    match (current.as_ref(), remote) {
        (Some(current), Some(remote)) if current == remote => {},
        (None, None) => {},
        (_, remote) => {
            let remote = remote.cloned().map(Value::Object);
            state.set_json(key, remote.as_ref());
        },
    }
}

/// Diagnostic for an attribute outside its allowed values.
pub(crate) fn check_one_of(config: &ResourceState, key: &str, allowed: &[&str]) -> Option<Diagnostic> {
    let value = config.get_str(key)?;
    if allowed.contains(&value) {
        return None;
    }
    Some(
        Diagnostic::error(format!("Invalid value for {}", key))
            .with_detail(format!(
                "expected one of {}, got '{}'",
                allowed.join(", "),
                value
            ))
            .with_attribute(key),
    )
}

/// Diagnostic for a JSON-encoded object attribute that does not parse as one.
pub(crate) fn check_json_object(config: &ResourceState, key: &str) -> Option<Diagnostic> {
    let err = config.get_json_object(key).err()?;
    Some(
        Diagnostic::error(format!("Invalid JSON in {}", key))
            .with_detail(err.message().to_string())
            .with_attribute(key),
    )
}

/// The `organization` attribute of workspace-level resources.
pub(crate) fn organization_attribute() -> Attribute {
    Attribute::optional_computed_string()
        .with_force_new()
        .with_description("Organization handle; defaults to the provider organization, then the authenticated user.")
}

/// Computed bookkeeping attributes common to every API object.
pub(crate) fn with_timestamps(schema: Schema) -> Schema {
    schema
        .with_attribute("created_at", Attribute::computed_string())
        .with_attribute("updated_at", Attribute::computed_string())
        .with_attribute("version_id", Attribute::computed_int64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(value: Value) -> ResourceState {
        ResourceState::from_value(value).unwrap()
    }

    #[test]
    fn test_type_names_are_unique() {
        let mut names: Vec<_> = all().iter().map(|r| r.type_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn test_every_schema_has_id() {
        for resource in all() {
            let schema = resource.schema();
            let id = schema.attribute("id").unwrap_or_else(|| panic!("{} has no id", resource.type_name()));
            assert!(id.is_computed_only());
        }
    }

    #[test]
    fn test_write_owner() {
        let mut s = ResourceState::new();
        write_owner(&mut s, &Owner::Org("acme".to_string()));
        assert_eq!(s.get_str("organization"), Some("acme"));
        write_owner(&mut s, &Owner::User("jane".to_string()));
        assert!(s.get("organization").is_none());
    }

    #[test]
    fn test_imported_state_records_id() {
        let s = imported_state(&Owner::User("jane".to_string()), "jane/dev");
        assert!(s.get("organization").is_none());
        assert_eq!(s.get_str("id"), Some("jane/dev"));

        let s = imported_state(&Owner::Org("acme".to_string()), "acme/dev");
        assert_eq!(s.get_str("organization"), Some("acme"));
    }

    #[test]
    fn test_refresh_json_keeps_equivalent_text() {
        let mut s = state(json!({"tags": "{ \"env\": \"prod\" }"}));
        let remote = json!({"env": "prod"});
        refresh_json(&mut s, "tags", remote.as_object());
        assert_eq!(s.get_str("tags"), Some("{ \"env\": \"prod\" }"));
    }

    #[test]
    fn test_refresh_json_takes_remote_changes() {
        let mut s = state(json!({"tags": "{\"env\":\"prod\"}"}));
        let remote = json!({"env": "dev"});
        refresh_json(&mut s, "tags", remote.as_object());
        assert_eq!(s.get_str("tags"), Some("{\"env\":\"dev\"}"));

        refresh_json(&mut s, "tags", None);
        assert!(s.get("tags").is_none());
    }

    #[test]
    fn test_refresh_json_keeps_configured_empty_object() {
        let mut s = state(json!({"args": "{}"}));
        let remote = json!({});
        refresh_json(&mut s, "args", remote.as_object());
        assert_eq!(s.get_str("args"), Some("{}"));

        refresh_json(&mut s, "args", None);
        assert_eq!(s.get_str("args"), Some("{}"));

        let remote = json!({"resource": "dashboard.cis"});
        refresh_json(&mut s, "args", remote.as_object());
        assert_eq!(s.get_str("args"), Some("{\"resource\":\"dashboard.cis\"}"));
    }

    #[test]
    fn test_check_json_object() {
        let s = state(json!({"args": "{\"resource\": \"x\"}", "tags": "[1]", "config": "{regions"}));
        assert!(check_json_object(&s, "args").is_none());
        assert!(check_json_object(&s, "missing").is_none());
        let diag = check_json_object(&s, "tags").unwrap();
        assert_eq!(diag.attribute.as_deref(), Some("tags"));
        assert!(diag.detail.unwrap().contains("must be a JSON object"));
        assert!(check_json_object(&s, "config").is_some());
    }

    #[test]
    fn test_check_one_of() {
        let s = state(json!({"role": "admin", "visibility": "workspace"}));
        let diag = check_one_of(&s, "role", &["member", "owner"]).unwrap();
        assert_eq!(diag.attribute.as_deref(), Some("role"));
        assert!(check_one_of(&s, "visibility", &["workspace", "anyone_with_link"]).is_none());
        assert!(check_one_of(&s, "missing", &["x"]).is_none());
    }
}
