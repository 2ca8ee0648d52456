use serde::{Deserialize, Serialize};

use super::client::segment;
use super::{ApiError, PipesClient};
use crate::owner::Owner;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub handle: String,
    #[serde(default)]
    pub identity_id: Option<String>,
    #[serde(default)]
    pub instance_type: Option<String>,
    #[serde(default)]
    pub desired_state: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub hive: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub database_name: Option<String>,
    #[serde(default)]
    pub db_volume_size_bytes: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub version_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateWorkspaceRequest {
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_volume_size_bytes: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateWorkspaceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_volume_size_bytes: Option<i64>,
}

impl UpdateWorkspaceRequest {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub(crate) fn workspace_path(owner: &Owner, workspace: &str) -> String {
    format!("{}/workspace/{}", owner.api_path(), segment(workspace))
}

impl PipesClient {
    pub async fn create_workspace(
        &self,
        owner: &Owner,
        request: &CreateWorkspaceRequest,
    ) -> Result<Workspace, ApiError> {
        self.post_json(&format!("{}/workspace", owner.api_path()), request)
            .await
    }

    pub async fn get_workspace(&self, owner: &Owner, workspace: &str) -> Result<Workspace, ApiError> {
        self.get_json(&workspace_path(owner, workspace)).await
    }

    pub async fn update_workspace(
        &self,
        owner: &Owner,
        workspace: &str,
        request: &UpdateWorkspaceRequest,
    ) -> Result<Workspace, ApiError> {
        self.patch_json(&workspace_path(owner, workspace), request)
            .await
    }

    pub async fn delete_workspace(&self, owner: &Owner, workspace: &str) -> Result<(), ApiError> {
        self.delete(&workspace_path(owner, workspace)).await
    }
}
