use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::client::segment;
use super::workspaces::workspace_path;
use super::{ApiError, PipesClient};
use crate::owner::Owner;

/// When a pipeline runs, e.g. `{"type": "interval", "schedule": "daily"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineFrequency {
    #[serde(rename = "type")]
    pub frequency_type: String,
    pub schedule: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Pipeline {
    pub id: String,
    pub title: String,
    pub pipeline: String,
    pub frequency: PipelineFrequency,
    #[serde(default)]
    pub args: Option<Map<String, Value>>,
    #[serde(default)]
    pub tags: Option<Map<String, Value>>,
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub identity_id: Option<String>,
    #[serde(default)]
    pub last_process_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub version_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePipelineRequest {
    pub title: String,
    pub pipeline: String,
    pub frequency: PipelineFrequency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdatePipelineRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<PipelineFrequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Map<String, Value>>,
}

fn pipeline_path(owner: &Owner, workspace: &str, pipeline_id: &str) -> String {
    format!(
        "{}/pipeline/{}",
        workspace_path(owner, workspace),
        segment(pipeline_id)
    )
}

impl PipesClient {
    pub async fn create_pipeline(
        &self,
        owner: &Owner,
        workspace: &str,
        request: &CreatePipelineRequest,
    ) -> Result<Pipeline, ApiError> {
        self.post_json(
            &format!("{}/pipeline", workspace_path(owner, workspace)),
            request,
        )
        .await
    }

    pub async fn get_pipeline(
        &self,
        owner: &Owner,
        workspace: &str,
        pipeline_id: &str,
    ) -> Result<Pipeline, ApiError> {
        self.get_json(&pipeline_path(owner, workspace, pipeline_id))
            .await
    }

    pub async fn update_pipeline(
        &self,
        owner: &Owner,
        workspace: &str,
        pipeline_id: &str,
        request: &UpdatePipelineRequest,
    ) -> Result<Pipeline, ApiError> {
        self.patch_json(&pipeline_path(owner, workspace, pipeline_id), request)
            .await
    }

    pub async fn delete_pipeline(
        &self,
        owner: &Owner,
        workspace: &str,
        pipeline_id: &str,
    ) -> Result<(), ApiError> {
        self.delete(&pipeline_path(owner, workspace, pipeline_id))
            .await
    }
}
