//! Typed access to resource configuration and state objects.

use serde_json::{Map, Value};

use crate::error::ProviderError;

/// A resource's attributes as a JSON object.
///
/// Getters treat null and empty strings as absent, which matches how the host
/// sends unset optional attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceState(Map<String, Value>);

impl ResourceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value; null becomes an empty object.
    pub fn from_value(value: Value) -> Result<Self, ProviderError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(ProviderError::Validation(format!(
                "expected an object, got {}",
                other
            ))),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Raw attribute value, `None` for absent or null.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn require_str(&self, key: &str) -> Result<&str, ProviderError> {
        self.get_str(key).ok_or_else(|| {
            ProviderError::Validation(format!("attribute '{}' must be set", key))
        })
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_str(key).map(str::to_string)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| {
            v.as_i64()
                .or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        })
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Nested object attribute (single nested block).
    pub fn get_object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.get(key).and_then(Value::as_object)
    }

    /// Parse a string attribute holding a JSON document.
    pub fn get_json(&self, key: &str) -> Result<Option<Value>, ProviderError> {
        match self.get_str(key) {
            Some(raw) => serde_json::from_str(raw).map(Some).map_err(|e| {
                ProviderError::Validation(format!("attribute '{}' is not valid JSON: {}", key, e))
            }),
            None => Ok(None),
        }
    }

    /// Parse a string attribute holding a JSON object.
    pub fn get_json_object(&self, key: &str) -> Result<Option<Map<String, Value>>, ProviderError> {
        match self.get_json(key)? {
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(ProviderError::Validation(format!(
                "attribute '{}' must be a JSON object, got {}",
                key,
                json_kind(&other)
            ))),
            None => Ok(None),
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Set an attribute, writing null for `None`.
    pub fn set_opt<T: Into<Value>>(&mut self, key: &str, value: Option<T>) -> &mut Self {
        let value = value.map(Into::into).unwrap_or(Value::Null);
        self.0.insert(key.to_string(), value);
        self
    }

    /// Store a JSON value as a JSON-encoded string attribute.
    pub fn set_json(&mut self, key: &str, value: Option<&Value>) -> &mut Self {
        let encoded = value.map(|v| Value::String(v.to_string()));
        self.set_opt(key, encoded)
    }

    /// Whether two states disagree on an attribute, ignoring null/absent differences.
    pub fn differs(&self, other: &ResourceState, key: &str) -> bool {
        self.get(key) != other.get(key)
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl From<Map<String, Value>> for ResourceState {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(value: Value) -> ResourceState {
        ResourceState::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let s = state(json!({"handle": "", "display_name": null, "url": "https://x"}));
        assert!(s.get_str("handle").is_none());
        assert!(s.get_str("display_name").is_none());
        assert_eq!(s.get_str("url"), Some("https://x"));
        assert!(s.require_str("handle").is_err());
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(ResourceState::from_value(json!([1, 2])).is_err());
        assert_eq!(ResourceState::from_value(Value::Null).unwrap(), ResourceState::new());
    }

    #[test]
    fn test_integral_float_is_i64() {
        let s = state(json!({"size": 1073741824.0, "bad": 1.5}));
        assert_eq!(s.get_i64("size"), Some(1_073_741_824));
        assert_eq!(s.get_i64("bad"), None);
    }

    #[test]
    fn test_json_attributes() {
        let s = state(json!({"config": "{\"regions\": [\"us-east-1\"]}", "broken": "{", "list": "[1]"}));
        let config = s.get_json_object("config").unwrap().unwrap();
        assert_eq!(config["regions"], json!(["us-east-1"]));
        assert!(s.get_json("broken").is_err());
        assert!(s.get_json_object("list").is_err());
        assert!(s.get_json_object("missing").unwrap().is_none());
    }

    #[test]
    fn test_setters() {
        let mut s = ResourceState::new();
        s.set("handle", "dev")
            .set_opt::<String>("url", None)
            .set_json("tags", Some(&json!({"env": "prod"})));
        let value = s.into_value();
        assert_eq!(value["handle"], "dev");
        assert!(value["url"].is_null());
        assert_eq!(value["tags"], "{\"env\":\"prod\"}");
    }

    #[test]
    fn test_differs_ignores_null_vs_absent() {
        let a = state(json!({"url": null}));
        let b = state(json!({}));
        assert!(!a.differs(&b, "url"));
        let c = state(json!({"url": "x"}));
        assert!(a.differs(&c, "url"));
    }
}
