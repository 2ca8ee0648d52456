use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::segment;
use super::workspaces::workspace_path;
use super::{ApiError, PipesClient};
use crate::owner::Owner;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkspaceMod {
    pub id: String,
    pub alias: String,
    pub path: String,
    #[serde(default)]
    pub constraint: Option<String>,
    #[serde(default)]
    pub installed_version: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub identity_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub version_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateWorkspaceModRequest {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateWorkspaceModRequest {
    pub constraint: String,
}

/// A variable declared by an installed mod, with its workspace setting.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModVariable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub variable_type: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub setting: Option<Value>,
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub workspace_mod_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub version_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateModVariableRequest {
    pub name: String,
    pub setting: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateModVariableRequest {
    pub setting: Value,
}

fn mod_path(owner: &Owner, workspace: &str, alias: &str) -> String {
    format!("{}/mod/{}", workspace_path(owner, workspace), segment(alias))
}

fn variable_path(owner: &Owner, workspace: &str, alias: &str, name: &str) -> String {
    format!(
        "{}/variable/{}",
        mod_path(owner, workspace, alias),
        segment(name)
    )
}

impl PipesClient {
    pub async fn install_workspace_mod(
        &self,
        owner: &Owner,
        workspace: &str,
        request: &CreateWorkspaceModRequest,
    ) -> Result<WorkspaceMod, ApiError> {
        self.post_json(&format!("{}/mod", workspace_path(owner, workspace)), request)
            .await
    }

    pub async fn get_workspace_mod(
        &self,
        owner: &Owner,
        workspace: &str,
        alias: &str,
    ) -> Result<WorkspaceMod, ApiError> {
        self.get_json(&mod_path(owner, workspace, alias)).await
    }

    pub async fn update_workspace_mod(
        &self,
        owner: &Owner,
        workspace: &str,
        alias: &str,
        request: &UpdateWorkspaceModRequest,
    ) -> Result<WorkspaceMod, ApiError> {
        self.patch_json(&mod_path(owner, workspace, alias), request)
            .await
    }

    pub async fn uninstall_workspace_mod(
        &self,
        owner: &Owner,
        workspace: &str,
        alias: &str,
    ) -> Result<(), ApiError> {
        self.delete(&mod_path(owner, workspace, alias)).await
    }

    pub async fn create_mod_variable_setting(
        &self,
        owner: &Owner,
        workspace: &str,
        alias: &str,
        request: &CreateModVariableRequest,
    ) -> Result<ModVariable, ApiError> {
        self.post_json(
            &format!("{}/variable", mod_path(owner, workspace, alias)),
            request,
        )
        .await
    }

    pub async fn get_mod_variable(
        &self,
        owner: &Owner,
        workspace: &str,
        alias: &str,
        name: &str,
    ) -> Result<ModVariable, ApiError> {
        self.get_json(&variable_path(owner, workspace, alias, name))
            .await
    }

    pub async fn update_mod_variable_setting(
        &self,
        owner: &Owner,
        workspace: &str,
        alias: &str,
        name: &str,
        request: &UpdateModVariableRequest,
    ) -> Result<ModVariable, ApiError> {
        self.patch_json(&variable_path(owner, workspace, alias, name), request)
            .await
    }

    pub async fn delete_mod_variable_setting(
        &self,
        owner: &Owner,
        workspace: &str,
        alias: &str,
        name: &str,
    ) -> Result<(), ApiError> {
        self.delete(&variable_path(owner, workspace, alias, name))
            .await
    }
}
