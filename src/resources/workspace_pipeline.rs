use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use super::{
    check_json_object, found, imported_state, organization_attribute, refresh_json, with_timestamps, write_owner, Resource,
};
use crate::api::{CreatePipelineRequest, Pipeline, PipelineFrequency, UpdatePipelineRequest};
use crate::error::ProviderError;
use crate::owner::{compose_id, split_id, Owner};
use crate::provider::ProviderContext;
use crate::schema::{Attribute, Block, Diagnostic, NestedBlock, Schema};
use crate::state::ResourceState;

/// `pipes_workspace_pipeline`: a scheduled pipeline run in a workspace.
pub struct WorkspacePipelineResource;

fn frequency(state: &ResourceState) -> Result<PipelineFrequency, ProviderError> {
    let block = state.get_object("frequency").ok_or_else(|| {
        ProviderError::Validation("a frequency block is required".to_string())
    })?;
    let field = |key: &str| {
        block
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Validation(format!("frequency.{} must be set", key)))
    };
    Ok(PipelineFrequency {
        frequency_type: field("type")?,
        schedule: field("schedule")?,
    })
}

fn write_state(state: &mut ResourceState, owner: &Owner, workspace: &str, pipeline: Pipeline) {
    write_owner(state, owner);
    refresh_json(state, "args", pipeline.args.as_ref());
    refresh_json(state, "tags", pipeline.tags.as_ref());
    state
        .set("id", compose_id(&[owner.handle(), workspace, &pipeline.id]))
        .set("workspace_handle", workspace)
        .set("title", pipeline.title)
        .set("pipeline", pipeline.pipeline)
        .set(
            "frequency",
            json!({
                "type": pipeline.frequency.frequency_type,
                "schedule": pipeline.frequency.schedule,
            }),
        )
        .set("pipeline_id", pipeline.id)
        .set_opt("workspace_id", pipeline.workspace_id)
        .set_opt("identity_id", pipeline.identity_id)
        .set_opt("last_process_id", pipeline.last_process_id)
        .set_opt("created_at", pipeline.created_at)
        .set_opt("updated_at", pipeline.updated_at)
        .set_opt("version_id", pipeline.version_id);
}

#[async_trait]
impl Resource for WorkspacePipelineResource {
    fn type_name(&self) -> &'static str {
        "pipes_workspace_pipeline"
    }

    fn schema(&self) -> Schema {
        let frequency = Block::new()
            .with_description("How often the pipeline runs.")
            .with_attribute(
                "type",
                Attribute::required_string().with_description("Frequency type, e.g. interval or cron."),
            )
            .with_attribute(
                "schedule",
                Attribute::required_string().with_description("Schedule, e.g. daily or a cron expression."),
            );

        with_timestamps(
            Schema::v0()
                .with_description("A pipeline scheduled in a workspace.")
                .with_attribute("id", Attribute::computed_string())
                .with_attribute("organization", organization_attribute())
                .with_attribute("workspace_handle", Attribute::required_string().with_force_new())
                .with_attribute("title", Attribute::required_string())
                .with_attribute(
                    "pipeline",
                    Attribute::required_string()
                        .with_force_new()
                        .with_description("Name of the pipeline to run, e.g. pipeline.snapshot_dashboard."),
                )
                .with_attribute(
                    "args",
                    Attribute::optional_string().with_description("JSON-encoded pipeline arguments."),
                )
                .with_attribute(
                    "tags",
                    Attribute::optional_string().with_description("JSON-encoded tags."),
                )
                .with_attribute("pipeline_id", Attribute::computed_string())
                .with_attribute("workspace_id", Attribute::computed_string())
                .with_attribute("identity_id", Attribute::computed_string())
                .with_attribute("last_process_id", Attribute::computed_string())
                .with_block("frequency", NestedBlock::single(frequency).with_min_items(1)),
        )
    }

    fn validate(&self, config: &ResourceState) -> Vec<Diagnostic> {
        ["args", "tags"]
            .iter()
            .filter_map(|key| check_json_object(config, key))
            .collect()
    }

    async fn create(&self, ctx: &ProviderContext, mut planned: ResourceState) -> Result<ResourceState, ProviderError> {
        let owner = ctx.resolve_owner(&planned).await?;
        let workspace = planned.require_str("workspace_handle")?.to_string();
        let request = CreatePipelineRequest {
            title: planned.require_str("title")?.to_string(),
            pipeline: planned.require_str("pipeline")?.to_string(),
            frequency: frequency(&planned)?,
            args: planned.get_json_object("args")?,
            tags: planned.get_json_object("tags")?,
        };

        let pipeline = ctx
            .client()
            .create_pipeline(&owner, &workspace, &request)
            .await?;
        info!(owner = %owner, workspace = %workspace, id = %pipeline.id, pipeline = %pipeline.pipeline, "Created pipeline");

        write_state(&mut planned, &owner, &workspace, pipeline);
        Ok(planned)
    }

    async fn read(
        &self,
        ctx: &ProviderContext,
        mut current: ResourceState,
    ) -> Result<Option<ResourceState>, ProviderError> {
        let owner = ctx.resolve_owner(&current).await?;
        let workspace = current.require_str("workspace_handle")?.to_string();
        let id = current.require_str("pipeline_id")?;
        let Some(pipeline) = found(ctx.client().get_pipeline(&owner, &workspace, id).await)? else {
            return Ok(None);
        };

        write_state(&mut current, &owner, &workspace, pipeline);
        Ok(Some(current))
    }

    async fn update(
        &self,
        ctx: &ProviderContext,
        prior: ResourceState,
        mut planned: ResourceState,
    ) -> Result<ResourceState, ProviderError> {
        let owner = ctx.resolve_owner(&prior).await?;
        let workspace = prior.require_str("workspace_handle")?;
        let id = prior.require_str("pipeline_id")?;

        let mut request = UpdatePipelineRequest::default();
        if prior.differs(&planned, "title") {
            request.title = planned.get_string("title");
        }
        if prior.differs(&planned, "frequency") {
            request.frequency = Some(frequency(&planned)?);
        }
        if prior.differs(&planned, "args") {
            request.args = Some(planned.get_json_object("args")?.unwrap_or_default());
        }
        if prior.differs(&planned, "tags") {
            request.tags = Some(planned.get_json_object("tags")?.unwrap_or_default());
        }

        let pipeline = ctx
            .client()
            .update_pipeline(&owner, workspace, id, &request)
            .await?;
        info!(owner = %owner, workspace, id, "Updated pipeline");

        write_state(&mut planned, &owner, workspace, pipeline);
        Ok(planned)
    }

    async fn delete(&self, ctx: &ProviderContext, current: ResourceState) -> Result<(), ProviderError> {
        let owner = ctx.resolve_owner(&current).await?;
        let workspace = current.require_str("workspace_handle")?;
        let id = current.require_str("pipeline_id")?;
        ctx.client().delete_pipeline(&owner, workspace, id).await?;
        info!(owner = %owner, workspace, id, "Deleted pipeline");
        Ok(())
    }

    async fn import_state(&self, ctx: &ProviderContext, id: &str) -> Result<ResourceState, ProviderError> {
        let [owner, workspace, pipeline_id] = split_id::<3>(id, "{owner}/{workspace_handle}/{pipeline_id}")?;
        let owner = ctx.owner_for_handle(owner).await?;
        let mut state = imported_state(&owner, id);
        state
            .set("workspace_handle", workspace)
            .set("pipeline_id", pipeline_id);
        Ok(state)
    }
}
