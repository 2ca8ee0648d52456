//! Error types for the Pipes provider.

use thiserror::Error;

use crate::api::ApiError;

/// Errors returned by provider operations.
///
/// Every variant carries the message that ends up in the host-facing
/// diagnostic, so API error text is preserved as-is.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested object was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The configuration or state failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An internal provider error occurred.
    #[error("Internal error: {0}")]
    Internal(String),

    /// The provider is not configured or its configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A JSON payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The gRPC transport failed.
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// The object already exists.
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// The API token is missing, invalid, or lacks access.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The API rate limit was hit.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// The API could not be reached or failed server-side.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The API rejected the request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// The bare message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Internal(msg)
            | Self::Configuration(msg)
            | Self::UnknownResource(msg)
            | Self::AlreadyExists(msg)
            | Self::PermissionDenied(msg)
            | Self::ResourceExhausted(msg)
            | Self::Unavailable(msg)
            | Self::InvalidRequest(msg) => msg,
            Self::Serialization(_) => "serialization error (see Debug output)",
            Self::Transport(_) => "transport error (see Debug output)",
        }
    }

    /// Whether this error means the remote object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<ApiError> for ProviderError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Api { status, message } => match status {
                404 => Self::NotFound(message),
                401 | 403 => Self::PermissionDenied(message),
                409 => Self::AlreadyExists(message),
                429 => Self::ResourceExhausted(message),
                500..=599 => Self::Unavailable(message),
                _ => Self::InvalidRequest(message),
            },
            ApiError::Network(err) => Self::Unavailable(err.to_string()),
            ApiError::Auth { message } => Self::Configuration(message),
            ApiError::Decode { context, source } => {
                Self::Internal(format!("failed to decode {}: {}", context, source))
            },
        }
    }
}

impl From<ProviderError> for tonic::Status {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(msg) => tonic::Status::not_found(msg),
            ProviderError::Validation(msg) => tonic::Status::invalid_argument(msg),
            ProviderError::Configuration(msg) => tonic::Status::failed_precondition(msg),
            ProviderError::UnknownResource(msg) => tonic::Status::not_found(msg),
            ProviderError::Internal(msg) => tonic::Status::internal(msg),
            ProviderError::Serialization(err) => {
                tonic::Status::invalid_argument(format!("Serialization error: {}", err))
            },
            ProviderError::Transport(err) => {
                tonic::Status::unavailable(format!("Transport error: {}", err))
            },
            ProviderError::AlreadyExists(msg) => tonic::Status::already_exists(msg),
            ProviderError::PermissionDenied(msg) => tonic::Status::permission_denied(msg),
            ProviderError::ResourceExhausted(msg) => tonic::Status::resource_exhausted(msg),
            ProviderError::Unavailable(msg) => tonic::Status::unavailable(msg),
            ProviderError::InvalidRequest(msg) => tonic::Status::invalid_argument(msg),
        }
    }
}
