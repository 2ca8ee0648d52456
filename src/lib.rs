//! Pipes Provider
//!
//! A provider plugin that manages Turbot Pipes organizations, workspaces,
//! connections, mods, pipelines and snapshots as declarative resources.
//!
//! # Overview
//!
//! The crate is split into:
//!
//! - **Plugin protocol**: gRPC types generated from `proto/provider.proto`, the
//!   [`ProviderService`] trait and the server that adapts one to the other
//! - **Schema types**: attribute and block descriptions, validation and the
//!   generic plan computation
//! - **API client**: a typed REST client for the Pipes API
//! - **Provider**: [`PipesProvider`], a registry of resources and data sources
//!   that translate lifecycle calls into API calls
//! - **Testing**: [`testing::ProviderTester`], which drives a provider without
//!   going through gRPC
//!
//! # Quick Start
//!
//! ```ignore
//! use pipes_provider::{init_logging, serve, PipesProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!     serve(PipesProvider::new()).await
//! }
//! ```
//!
//! # Handshake Protocol
//!
//! When the provider starts via [`serve`], it writes a handshake line to stdout:
//!
//! ```text
//! PIPES_PROVIDER|1|127.0.0.1:50051
//! ```
//!
//! Format: `PIPES_PROVIDER|<protocol_version>|<address>`
//!
//! The host spawns the provider as a subprocess, reads this line and connects
//! over gRPC. Every payload on the wire is a JSON document carried as bytes.
//!
//! # Provider Protocol
//!
//! - **GetMetadata**: resource and data source names plus capabilities
//! - **GetSchema**: schemas of the provider block, resources and data sources
//! - **ValidateProviderConfig** / **Configure**: provider block handling
//! - **Stop**: graceful shutdown
//! - **ValidateResourceConfig**, **UpgradeResourceState**, **Plan**
//! - **Create/Read/Update/Delete**: resource lifecycle
//! - **ImportResourceState**: adopt existing objects by ID
//! - **ValidateDataSourceConfig** / **ReadDataSource**: data sources

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod data_sources;
pub mod error;
pub mod logging;
pub mod owner;
pub mod plan;
pub mod provider;
pub mod resources;
pub mod retry;
pub mod schema;
pub mod server;
pub mod state;
pub mod testing;
pub mod types;
pub mod validation;

/// Types generated from `proto/provider.proto`.
#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod generated {
    tonic::include_proto!("pipes.provider.v1");
}

// Re-export main types at crate root
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::{PipesProvider, ProviderContext};
pub use schema::ProviderSchema;
pub use server::{
    serve, serve_on, serve_on_with_options, serve_with_options, serve_with_shutdown,
    ProviderService, ServeOptions,
};
pub use types::{
    AttributeChange, ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities,
    HANDSHAKE_PREFIX, PROTOCOL_VERSION,
};
pub use validation::{is_valid, validate, validate_result};

pub use async_trait::async_trait;

pub use serde_json;
pub use tonic;
pub use tracing;
