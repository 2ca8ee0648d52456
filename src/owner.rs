//! Organization or user scoping of workspace-level objects.
//!
//! Workspaces, connections and everything inside a workspace live either
//! under an organization or under the authenticated user. The owner is
//! resolved from the resource's `organization` attribute, then the provider's
//! default organization, then the actor. Going the other way, the owner
//! segment of an imported ID is a user only when it matches the actor.

use std::fmt;

use crate::error::ProviderError;

/// The identity a workspace-level object belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Owned by a user, identified by handle.
    User(String),
    /// Owned by an organization, identified by handle.
    Org(String),
}

impl Owner {
    pub fn handle(&self) -> &str {
        match self {
            Self::User(handle) | Self::Org(handle) => handle,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Self::User(_))
    }

    /// Organization handle to store in the `organization` attribute.
    pub fn organization(&self) -> Option<&str> {
        match self {
            Self::Org(handle) => Some(handle),
            Self::User(_) => None,
        }
    }

    /// API path prefix, e.g. `/org/acme`.
    pub fn api_path(&self) -> String {
        let encoded = urlencoding::encode(self.handle());
        match self {
            Self::User(_) => format!("/user/{}", encoded),
            Self::Org(_) => format!("/org/{}", encoded),
        }
    }

    /// Pick the owner for an ID segment given the actor's handle.
    pub fn from_id_segment(handle: &str, actor_handle: &str) -> Self {
        if handle == actor_handle {
            Self::User(handle.to_string())
        } else {
            Self::Org(handle.to_string())
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.handle())
    }
}

/// Join ID segments with `/`.
pub fn compose_id(parts: &[&str]) -> String {
    parts.join("/")
}

/// Split a composite ID into exactly `N` non-empty segments.
///
/// `format` describes the expected shape for the error message.
pub fn split_id<'a, const N: usize>(
    id: &'a str,
    format: &str,
) -> Result<[&'a str; N], ProviderError> {
    let parts: Vec<&str> = id.split('/').collect();
    if parts.len() != N || parts.iter().any(|p| p.is_empty()) {
        return Err(ProviderError::Validation(format!(
            "unexpected ID '{}', expected {}",
            id, format
        )));
    }

    let mut out: [&'a str; N] = [""; N];
    out.copy_from_slice(&parts);
    Ok(out)
}
