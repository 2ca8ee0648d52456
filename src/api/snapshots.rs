use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::client::segment;
use super::workspaces::workspace_path;
use super::{ApiError, PipesClient};
use crate::owner::Owner;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Snapshot {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub dashboard_name: Option<String>,
    #[serde(default)]
    pub dashboard_title: Option<String>,
    #[serde(default)]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub tags: Option<Map<String, Value>>,
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
pub struct CreateSnapshotRequest {
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateSnapshotRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Map<String, Value>>,
}

fn snapshot_path(owner: &Owner, workspace: &str, snapshot_id: &str) -> String {
    format!(
        "{}/snapshot/{}",
        workspace_path(owner, workspace),
        segment(snapshot_id)
    )
}

impl PipesClient {
    pub async fn create_snapshot(
        &self,
        owner: &Owner,
        workspace: &str,
        request: &CreateSnapshotRequest,
    ) -> Result<Snapshot, ApiError> {
        self.post_json(
            &format!("{}/snapshot", workspace_path(owner, workspace)),
            request,
        )
        .await
    }

    pub async fn get_snapshot(
        &self,
        owner: &Owner,
        workspace: &str,
        snapshot_id: &str,
    ) -> Result<Snapshot, ApiError> {
        self.get_json(&snapshot_path(owner, workspace, snapshot_id))
            .await
    }

    pub async fn update_snapshot(
        &self,
        owner: &Owner,
        workspace: &str,
        snapshot_id: &str,
        request: &UpdateSnapshotRequest,
    ) -> Result<Snapshot, ApiError> {
        self.patch_json(&snapshot_path(owner, workspace, snapshot_id), request)
            .await
    }

    pub async fn delete_snapshot(
        &self,
        owner: &Owner,
        workspace: &str,
        snapshot_id: &str,
    ) -> Result<(), ApiError> {
        self.delete(&snapshot_path(owner, workspace, snapshot_id))
            .await
    }
}
