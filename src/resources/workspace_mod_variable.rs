//! `pipes_workspace_mod_variable`: the workspace setting of a mod variable.
//!
//! Settings are configured as strings. Before they are sent, they are
//! converted to the variable's declared type; on read the API value is
//! rendered back to a string.

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::{found, imported_state, organization_attribute, with_timestamps, write_owner, Resource};
use crate::api::{CreateModVariableRequest, ModVariable, UpdateModVariableRequest};
use crate::error::ProviderError;
use crate::owner::{compose_id, split_id, Owner};
use crate::provider::ProviderContext;
use crate::schema::{Attribute, Schema};
use crate::state::ResourceState;

pub struct WorkspaceModVariableResource;

/// Convert a configured setting to the variable's declared type.
pub(crate) fn convert_setting(raw: &str, variable_type: Option<&str>) -> Result<Value, ProviderError> {
    let invalid = |expected: &str, detail: String| {
        ProviderError::Validation(format!(
            "setting '{}' is not a valid {}: {}",
            raw, expected, detail
        ))
    };

    match variable_type.unwrap_or("string") {
        "string" => Ok(Value::String(raw.to_string())),
        "number" => match serde_json::from_str::<Value>(raw.trim()) {
            Ok(number @ Value::Number(_)) => Ok(number),
            Ok(other) => Err(invalid("number", format!("got {}", crate::state::json_kind(&other)))),
            Err(e) => Err(invalid("number", e.to_string())),
        },
        "bool" => match raw.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            other => Err(invalid("bool", format!("expected true or false, got '{}'", other))),
        },
        _ => serde_json::from_str(raw).map_err(|e| invalid("JSON value", e.to_string())),
    }
}

/// Render an API value as a setting string: strings verbatim, everything else as JSON.
pub(crate) fn render_setting(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_state(
    state: &mut ResourceState,
    owner: &Owner,
    workspace: &str,
    alias: &str,
    variable: ModVariable,
) {
    write_owner(state, owner);
    let remote = variable.setting.as_ref().filter(|v| !v.is_null());
    // Keep the configured text when it converts to the remote value.
    let unchanged = match (state.get_str("setting"), remote) {
        (Some(current), Some(remote)) => {
            convert_setting(current, variable.variable_type.as_deref()).is_ok_and(|v| &v == remote)
        },
        _ => false,
    };
    if !unchanged {
        let setting = remote.map(render_setting);
        state.set_opt("setting", setting);
    }
    let default = variable.default.as_ref().filter(|v| !v.is_null()).map(render_setting);
    state
        .set("id", compose_id(&[owner.handle(), workspace, alias, &variable.name]))
        .set("workspace_handle", workspace)
        .set("mod_alias", alias)
        .set("name", variable.name)
        .set_opt("default_value", default)
        .set_opt("type", variable.variable_type)
        .set_opt("description", variable.description)
        .set("workspace_mod_variable_id", variable.id)
        .set_opt("created_at", variable.created_at)
        .set_opt("updated_at", variable.updated_at)
        .set_opt("version_id", variable.version_id);
}

/// Workspace, mod alias and variable name of a state.
fn location(state: &ResourceState) -> Result<(String, String, String), ProviderError> {
    Ok((
        state.require_str("workspace_handle")?.to_string(),
        state.require_str("mod_alias")?.to_string(),
        state.require_str("name")?.to_string(),
    ))
}

#[async_trait]
impl Resource for WorkspaceModVariableResource {
    fn type_name(&self) -> &'static str {
        "pipes_workspace_mod_variable"
    }

    fn schema(&self) -> Schema {
        with_timestamps(
            Schema::v0()
                .with_description("Setting of a variable declared by a workspace mod.")
                .with_attribute("id", Attribute::computed_string())
                .with_attribute("organization", organization_attribute())
                .with_attribute("workspace_handle", Attribute::required_string().with_force_new())
                .with_attribute("mod_alias", Attribute::required_string().with_force_new())
                .with_attribute("name", Attribute::required_string().with_force_new())
                .with_attribute(
                    "setting",
                    Attribute::required_string().with_description(
                        "Value of the variable. Numbers, bools and JSON values are written as strings and converted to the declared type.",
                    ),
                )
                .with_attribute("default_value", Attribute::computed_string())
                .with_attribute("type", Attribute::computed_string())
                .with_attribute("description", Attribute::computed_string())
                .with_attribute("workspace_mod_variable_id", Attribute::computed_string()),
        )
    }

    async fn create(&self, ctx: &ProviderContext, mut planned: ResourceState) -> Result<ResourceState, ProviderError> {
        let owner = ctx.resolve_owner(&planned).await?;
        let (workspace, alias, name) = location(&planned)?;
        let raw = planned.require_str("setting")?;

        let declared = ctx
            .client()
            .get_mod_variable(&owner, &workspace, &alias, &name)
            .await?;
        let request = CreateModVariableRequest {
            name: name.clone(),
            setting: convert_setting(raw, declared.variable_type.as_deref())?,
        };
        let variable = ctx
            .client()
            .create_mod_variable_setting(&owner, &workspace, &alias, &request)
            .await?;
        info!(owner = %owner, workspace = %workspace, alias = %alias, name = %name, "Set mod variable");

        write_state(&mut planned, &owner, &workspace, &alias, variable);
        Ok(planned)
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        mut current: ResourceState,
    ) -> Result<Option<ResourceState>, ProviderError> {
        let owner = ctx.resolve_owner(&current).await?;
        let (workspace, alias, name) = location(&current)?;
        let result = ctx
            .client()
            .get_mod_variable(&owner, &workspace, &alias, &name)
            .await;
        let Some(variable) = found(result)? else {
            return Ok(None);
        };
        if variable.setting.as_ref().filter(|v| !v.is_null()).is_none() {
            // The variable still exists but its setting was removed.
            return Ok(None);
        }

        write_state(&mut current, &owner, &workspace, &alias, variable);
        Ok(Some(current))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: ResourceState,
        mut planned: ResourceState,
    ) -> Result<ResourceState, ProviderError> {
        let owner = ctx.resolve_owner(&prior).await?;
        let (workspace, alias, name) = location(&prior)?;
        let raw = planned.require_str("setting")?;
        let request = UpdateModVariableRequest {
            setting: convert_setting(raw, prior.get_str("type"))?,
        };

        let variable = ctx
            .client()
            .update_mod_variable_setting(&owner, &workspace, &alias, &name, &request)
            .await?;
        info!(owner = %owner, workspace = %workspace, alias = %alias, name = %name, "Updated mod variable");

        write_state(&mut planned, &owner, &workspace, &alias, variable);
        Ok(planned)
    }

    async fn delete(&self, ctx: &ProviderContext, current: ResourceState) -> Result<(), ProviderError> {
        let owner = ctx.resolve_owner(&current).await?;
        let (workspace, alias, name) = location(&current)?;
        ctx.client()
            .delete_mod_variable_setting(&owner, &workspace, &alias, &name)
            .await?;
        info!(owner = %owner, workspace = %workspace, alias = %alias, name = %name, "Removed mod variable setting");
        Ok(())
    }

    async fn import_state(&self, ctx: &ProviderContext, id: &str) -> Result<ResourceState, ProviderError> {
        let [owner, workspace, alias, name] =
            split_id::<4>(id, "{owner}/{workspace_handle}/{mod_alias}/{variable_name}")?;
        let owner = ctx.owner_for_handle(owner).await?;
        let mut state = imported_state(&owner, id);
        state
            .set("workspace_handle", workspace)
            .set("mod_alias", alias)
            .set("name", name);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_convert_setting_by_type() {
        assert_eq!(convert_setting("us-east-1", Some("string")).unwrap(), json!("us-east-1"));
        assert_eq!(convert_setting("42", Some("number")).unwrap(), json!(42));
        assert_eq!(convert_setting("0.5", Some("number")).unwrap(), json!(0.5));
        assert_eq!(convert_setting("true", Some("bool")).unwrap(), json!(true));
        assert_eq!(
            convert_setting("[\"a\", \"b\"]", Some("list(string)")).unwrap(),
            json!(["a", "b"])
        );
        assert_eq!(convert_setting("{\"k\": 1}", Some("map(number)")).unwrap(), json!({"k": 1}));
    }

    #[test]
    fn test_untyped_setting_is_a_string() {
        assert_eq!(convert_setting("42", None).unwrap(), json!("42"));
    }

    #[test]
    fn test_convert_setting_errors() {
        assert!(convert_setting("forty-two", Some("number")).is_err());
        assert!(convert_setting("\"42\"", Some("number")).is_err());
        assert!(convert_setting("yes", Some("bool")).is_err());
        assert!(convert_setting("[1,", Some("list(number)")).is_err());
    }

    #[test]
    fn test_write_state_keeps_equivalent_setting() {
        let variable: ModVariable = serde_json::from_value(json!({
            "id": "v_1",
            "name": "regions",
            "type": "list(string)",
            "setting": ["us-east-1", "eu-west-1"]
        }))
        .unwrap();
        let owner = Owner::Org("acme".to_string());

        let mut state = ResourceState::from_value(json!({"setting": "[\"us-east-1\", \"eu-west-1\"]"})).unwrap();
        write_state(&mut state, &owner, "dev", "aws_compliance", variable.clone());
        assert_eq!(state.get_str("setting"), Some("[\"us-east-1\", \"eu-west-1\"]"));
        assert_eq!(state.get_str("id"), Some("acme/dev/aws_compliance/regions"));

        let mut state = ResourceState::from_value(json!({"setting": "[\"us-east-1\"]"})).unwrap();
        write_state(&mut state, &owner, "dev", "aws_compliance", variable);
        assert_eq!(state.get_str("setting"), Some("[\"us-east-1\",\"eu-west-1\"]"));
    }

    #[test]
    fn test_render_setting() {
        assert_eq!(render_setting(&json!("us-east-1")), "us-east-1");
        assert_eq!(render_setting(&json!(42)), "42");
        assert_eq!(render_setting(&json!(false)), "false");
        assert_eq!(render_setting(&json!(["a", "b"])), "[\"a\",\"b\"]");
    }
}
