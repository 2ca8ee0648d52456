//! Plan, import and metadata types shared by the provider and the server.
//!
//! These are the ergonomic counterparts of the protobuf messages; JSON values
//! travel over the wire as encoded bytes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A change to a single attribute during a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Dotted path of the attribute.
    pub path: String,
    /// Value before the change, `None` when the attribute is being added.
    pub before: Option<Value>,
    /// Value after the change, `None` when the attribute is being removed.
    pub after: Option<Value>,
}

impl AttributeChange {
    pub fn new(path: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, None, Some(value))
    }

    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, Some(value), None)
    }

    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self::new(path, Some(before), Some(after))
    }
}

fn decode_optional(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        None
    } else {
        serde_json::from_slice(bytes).ok()
    }
}

fn encode_optional(value: Option<Value>) -> Vec<u8> {
    value
        .and_then(|v| serde_json::to_vec(&v).ok())
        .unwrap_or_default()
}

impl From<crate::generated::AttributeChange> for AttributeChange {
    fn from(proto: crate::generated::AttributeChange) -> Self {
        Self {
            path: proto.path,
            before: decode_optional(&proto.before),
            after: decode_optional(&proto.after),
        }
    }
}

impl From<AttributeChange> for crate::generated::AttributeChange {
    fn from(change: AttributeChange) -> Self {
        Self {
            path: change.path,
            before: encode_optional(change.before),
            after: encode_optional(change.after),
        }
    }
}

/// The outcome of planning a create, update or destroy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The state expected after apply; null for a destroy.
    pub planned_state: Value,
    pub changes: Vec<AttributeChange>,
    /// A force-new attribute changed, so the object must be recreated.
    pub requires_replace: bool,
}

impl PlanResult {
    pub fn no_change(state: Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }

    pub fn with_changes(
        planned_state: Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// A resource brought under management by import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    pub resource_type: String,
    pub state: Value,
}

impl ImportedResource {
    pub fn new(resource_type: impl Into<String>, state: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Provider metadata returned by `GetMetadata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    pub resources: Vec<String>,
    pub data_sources: Vec<String>,
    pub capabilities: ServerCapabilities,
}

/// Server capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServerCapabilities {
    /// Destroy plans go through the provider rather than being inferred by the host.
    pub plan_destroy: bool,
}

/// The protocol version announced in the handshake.
pub const PROTOCOL_VERSION: u32 = 1;

/// The first field of the handshake line.
pub const HANDSHAKE_PREFIX: &str = "PIPES_PROVIDER";

/// Format the handshake line printed to stdout once the server is listening.
pub fn handshake_line(addr: impl std::fmt::Display) -> String {
    format!("{}|{}|{}", HANDSHAKE_PREFIX, PROTOCOL_VERSION, addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_change_constructors() {
        let added = AttributeChange::added("handle", json!("dev"));
        assert!(added.before.is_none());
        assert_eq!(added.after, Some(json!("dev")));

        let removed = AttributeChange::removed("handle", json!("dev"));
        assert_eq!(removed.before, Some(json!("dev")));
        assert!(removed.after.is_none());
    }

    #[test]
    fn test_attribute_change_proto_conversion() {
        let change = AttributeChange::modified("instance_type", json!("db1.shared"), json!("db1.small"));
        let proto: crate::generated::AttributeChange = change.clone().into();
        assert_eq!(proto.path, "instance_type");
        assert_eq!(proto.before, b"\"db1.shared\"".to_vec());

        let back: AttributeChange = proto.into();
        assert_eq!(back, change);
    }

    #[test]
    fn test_absent_values_encode_empty() {
        let proto: crate::generated::AttributeChange =
            AttributeChange::added("title", json!("Nightly")).into();
        assert!(proto.before.is_empty());
        let back: AttributeChange = proto.into();
        assert!(back.before.is_none());
    }

    #[test]
    fn test_plan_result() {
        let unchanged = PlanResult::no_change(json!({"handle": "dev"}));
        assert!(!unchanged.has_changes());
        assert!(!unchanged.requires_replace);

        let replace = PlanResult::with_changes(
            json!({"handle": "prod"}),
            vec![AttributeChange::modified("handle", json!("dev"), json!("prod"))],
            true,
        );
        assert!(replace.has_changes());
        assert!(replace.requires_replace);
    }

    #[test]
    fn test_handshake_line() {
        assert_eq!(
            handshake_line("127.0.0.1:50051"),
            "PIPES_PROVIDER|1|127.0.0.1:50051"
        );
    }
}
