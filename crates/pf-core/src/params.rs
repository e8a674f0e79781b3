//! Page parameters
//!
//! Parameters stay a string-keyed map of JSON values at the routing layer.
//! Pages narrow them on receipt through the typed accessors below, so a
//! missing or mistyped value is reported once, at the top of `build`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// The JSON kind of a value, used for parameter and state validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Classify a JSON value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(n) if n.is_i64() || n.is_u64() => ValueKind::Integer,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Whether a value of kind `found` satisfies this kind.
    /// Integers are accepted where a number is expected.
    pub fn admits(self, found: ValueKind) -> bool {
        self == found || (self == ValueKind::Number && found == ValueKind::Integer)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Integer => "integer",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised when a page narrows its parameters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("missing parameter '{0}'")]
    Missing(String),

    #[error("parameter '{key}' should be {expected}, got {found}")]
    WrongType {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },
}

/// String-keyed parameters passed to a page's `build`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageParams(IndexMap<String, Value>);

impl PageParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Optional string parameter. Present-but-mistyped is an error.
    pub fn str(&self, key: &str) -> Result<Option<&str>, ParamError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(wrong_type(key, ValueKind::String, other)),
        }
    }

    pub fn require_str(&self, key: &str) -> Result<&str, ParamError> {
        self.str(key)?.ok_or_else(|| ParamError::Missing(key.to_string()))
    }

    /// Optional integer parameter
    pub fn i64(&self, key: &str) -> Result<Option<i64>, ParamError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| wrong_type(key, ValueKind::Integer, value)),
        }
    }

    pub fn require_i64(&self, key: &str) -> Result<i64, ParamError> {
        self.i64(key)?.ok_or_else(|| ParamError::Missing(key.to_string()))
    }

    /// Optional boolean parameter
    pub fn bool(&self, key: &str) -> Result<Option<bool>, ParamError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(wrong_type(key, ValueKind::Bool, other)),
        }
    }

    pub fn require_bool(&self, key: &str) -> Result<bool, ParamError> {
        self.bool(key)?.ok_or_else(|| ParamError::Missing(key.to_string()))
    }
}

fn wrong_type(key: &str, expected: ValueKind, found: &Value) -> ParamError {
    ParamError::WrongType {
        key: key.to_string(),
        expected,
        found: ValueKind::of(found),
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PageParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Display for PageParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_accessors() {
        let params = PageParams::new()
            .with("tab", "general")
            .with("page", 3)
            .with("compact", true);

        assert_eq!(params.require_str("tab").unwrap(), "general");
        assert_eq!(params.require_i64("page").unwrap(), 3);
        assert_eq!(params.bool("compact").unwrap(), Some(true));
        assert_eq!(params.str("missing").unwrap(), None);
    }

    #[test]
    fn test_missing_and_mistyped() {
        let params = PageParams::new().with("tab", 7);

        assert_eq!(
            params.require_str("tab"),
            Err(ParamError::WrongType {
                key: "tab".to_string(),
                expected: ValueKind::String,
                found: ValueKind::Integer,
            })
        );
        assert_eq!(
            params.require_bool("flag"),
            Err(ParamError::Missing("flag".to_string()))
        );
    }

    #[test]
    fn test_insertion_order_and_display() {
        let params: PageParams = [("b", json!(1)), ("a", json!("x"))].into_iter().collect();
        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(params.to_string(), r#"{b: 1, a: "x"}"#);
    }

    #[test]
    fn test_number_admits_integer() {
        assert!(ValueKind::Number.admits(ValueKind::Integer));
        assert!(!ValueKind::Integer.admits(ValueKind::Number));
        assert_eq!(ValueKind::of(&json!(1.5)), ValueKind::Number);
    }
}
