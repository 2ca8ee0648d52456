//! Typed client for the Pipes REST API.
//!
//! [`PipesClient`] handles transport, the bearer token, and error decoding.
//! Endpoint methods are grouped by area in the submodules, each next to the
//! serde models it sends and receives.

mod client;
mod connections;
mod error;
mod organizations;
mod pipelines;
mod snapshots;
mod users;
mod workspace_mods;
mod workspaces;

pub use client::{ListResponse, PipesClient};
pub use connections::{
    Connection, CreateConnectionRequest, CreateWorkspaceConnectionRequest,
    UpdateConnectionRequest, WorkspaceConnection,
};
pub use error::ApiError;
pub use organizations::{
    CreateOrgRequest, InviteOrgMemberRequest, OrgMember, Organization, UpdateOrgMemberRequest,
    UpdateOrgRequest,
};
pub use pipelines::{CreatePipelineRequest, Pipeline, PipelineFrequency, UpdatePipelineRequest};
pub use snapshots::{CreateSnapshotRequest, Snapshot, UpdateSnapshotRequest};
pub use users::{UpdateUserPreferencesRequest, User, UserPreferences, UserSummary};
pub use workspace_mods::{
    CreateModVariableRequest, CreateWorkspaceModRequest, ModVariable, UpdateModVariableRequest,
    UpdateWorkspaceModRequest, WorkspaceMod,
};
pub use workspaces::{CreateWorkspaceRequest, UpdateWorkspaceRequest, Workspace};
