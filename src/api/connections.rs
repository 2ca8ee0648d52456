use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::client::segment;
use super::workspaces::workspace_path;
use super::{ApiError, PipesClient};
use crate::owner::Owner;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Connection {
    pub id: String,
    pub handle: String,
    pub plugin: String,
    #[serde(default)]
    pub identity_id: Option<String>,
    #[serde(default, rename = "type")]
    pub connection_type: Option<String>,
    #[serde(default)]
    pub config: Option<Map<String, Value>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub version_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateConnectionRequest {
    pub handle: String,
    pub plugin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateConnectionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}

/// Association between a workspace and a connection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkspaceConnection {
    pub id: String,
    pub workspace_id: String,
    pub connection_id: String,
    #[serde(default)]
    pub identity_id: Option<String>,
    #[serde(default)]
    pub connection: Option<Connection>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub version_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateWorkspaceConnectionRequest {
    pub connection_handle: String,
}

fn connection_path(owner: &Owner, connection: &str) -> String {
    format!("{}/conn/{}", owner.api_path(), segment(connection))
}

fn association_path(owner: &Owner, workspace: &str, connection: &str) -> String {
    format!(
        "{}/conn/{}",
        workspace_path(owner, workspace),
        segment(connection)
    )
}

impl PipesClient {
    pub async fn create_connection(
        &self,
        owner: &Owner,
        request: &CreateConnectionRequest,
    ) -> Result<Connection, ApiError> {
        self.post_json(&format!("{}/conn", owner.api_path()), request)
            .await
    }

    pub async fn get_connection(
        &self,
        owner: &Owner,
        connection: &str,
    ) -> Result<Connection, ApiError> {
        self.get_json(&connection_path(owner, connection)).await
    }

    pub async fn update_connection(
        &self,
        owner: &Owner,
        connection: &str,
        request: &UpdateConnectionRequest,
    ) -> Result<Connection, ApiError> {
        self.patch_json(&connection_path(owner, connection), request)
            .await
    }

    pub async fn delete_connection(&self, owner: &Owner, connection: &str) -> Result<(), ApiError> {
        self.delete(&connection_path(owner, connection)).await
    }

    pub async fn create_workspace_connection(
        &self,
        owner: &Owner,
        workspace: &str,
        request: &CreateWorkspaceConnectionRequest,
    ) -> Result<WorkspaceConnection, ApiError> {
        self.post_json(&format!("{}/conn", workspace_path(owner, workspace)), request)
            .await
    }

    pub async fn get_workspace_connection(
        &self,
        owner: &Owner,
        workspace: &str,
        connection: &str,
    ) -> Result<WorkspaceConnection, ApiError> {
        self.get_json(&association_path(owner, workspace, connection))
            .await
    }

    pub async fn delete_workspace_connection(
        &self,
        owner: &Owner,
        workspace: &str,
        connection: &str,
    ) -> Result<(), ApiError> {
        self.delete(&association_path(owner, workspace, connection))
            .await
    }
}
