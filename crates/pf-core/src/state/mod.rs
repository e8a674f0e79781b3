//! Application state shared between the navigator and pages
//!
//! Every key must be declared in a schema that fixes which JSON kinds it
//! accepts and its default. Reads and writes of undeclared keys, or writes
//! of the wrong kind, are rejected.

use crate::params::ValueKind;
use ahash::AHashMap;
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised by [`AppState`]
#[derive(Error, Debug)]
pub enum StateError {
    #[error("invalid state key '{key}'")]
    UnknownKey { key: String },

    #[error("invalid type for '{key}': expected {expected}, got {found}")]
    TypeMismatch {
        key: String,
        expected: String,
        found: ValueKind,
    },

    #[error("state key '{key}' already exists in schema")]
    DuplicateKey { key: String },

    #[error("state file must contain a JSON object")]
    NotAnObject,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Declaration of one state key
#[derive(Debug, Clone, PartialEq)]
pub struct StateKey {
    allowed: Vec<ValueKind>,
    default: Value,
}

impl StateKey {
    pub fn new(allowed: impl Into<Vec<ValueKind>>, default: impl Into<Value>) -> Self {
        Self {
            allowed: allowed.into(),
            default: default.into(),
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        let found = ValueKind::of(value);
        self.allowed.iter().any(|kind| kind.admits(found))
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    fn expected(&self) -> String {
        self.allowed
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Ordered key declarations
pub type StateSchema = IndexMap<String, StateKey>;

/// Point-in-time copy of state values, in schema order
pub type StateSnapshot = IndexMap<String, Value>;

/// Keys the navigator mirrors into state
pub mod keys {
    pub const CURRENT_PAGE: &str = "current_page";
    pub const PREVIOUS_PAGE: &str = "previous_page";
    pub const NAVIGATION_HISTORY: &str = "navigation_history";
    pub const HISTORY_INDEX: &str = "history_index";
    pub const THEME: &str = "theme";
    pub const DEBUG_MODE: &str = "debug_mode";
    pub const SESSION_DATA: &str = "session_data";
}

/// The schema every application starts from
pub fn default_schema() -> StateSchema {
    use ValueKind::*;

    let mut schema = StateSchema::new();
    schema.insert(keys::CURRENT_PAGE.into(), StateKey::new([String, Null], Value::Null));
    schema.insert(keys::PREVIOUS_PAGE.into(), StateKey::new([String, Null], Value::Null));
    schema.insert(keys::NAVIGATION_HISTORY.into(), StateKey::new([Array], json!([])));
    schema.insert(keys::HISTORY_INDEX.into(), StateKey::new([Integer], -1));
    schema.insert(keys::THEME.into(), StateKey::new([String], "dark"));
    schema.insert(keys::DEBUG_MODE.into(), StateKey::new([Bool], false));
    schema.insert(keys::SESSION_DATA.into(), StateKey::new([Object], json!({})));
    schema
}

/// Schema-validated application state
#[derive(Debug, Clone)]
pub struct AppState {
    schema: StateSchema,
    values: AHashMap<String, Value>,
}

impl AppState {
    /// Create state with the default schema
    pub fn new() -> Self {
        Self::with_schema(default_schema())
    }

    /// Create state with a custom schema
    pub fn with_schema(schema: StateSchema) -> Self {
        let values = schema
            .iter()
            .map(|(key, decl)| (key.clone(), decl.default.clone()))
            .collect();
        info!("AppState initialised with {} keys", schema.len());
        Self { schema, values }
    }

    pub fn get_state(&self, key: &str) -> Result<&Value, StateError> {
        self.values.get(key).ok_or_else(|| StateError::UnknownKey {
            key: key.to_string(),
        })
    }

    pub fn set_state(&mut self, key: &str, value: impl Into<Value>) -> Result<(), StateError> {
        let value = value.into();
        self.validate(key, &value)?;
        debug!("State set: {} = {}", key, value);
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Apply several updates in order, stopping at the first invalid one
    pub fn update_state<K, V, I>(&mut self, updates: I) -> Result<(), StateError>
    where
        K: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in updates {
            self.set_state(key.as_ref(), value)?;
        }
        Ok(())
    }

    /// Restore every key to its default
    pub fn reset_state(&mut self) {
        for (key, decl) in &self.schema {
            self.values.insert(key.clone(), decl.default.clone());
        }
        info!("State reset to defaults");
    }

    /// Declare additional keys. Fails without changes if any already exists.
    pub fn extend_schema(&mut self, additional: StateSchema) -> Result<(), StateError> {
        if let Some(key) = additional.keys().find(|k| self.schema.contains_key(*k)) {
            return Err(StateError::DuplicateKey { key: key.clone() });
        }

        let count = additional.len();
        for (key, decl) in additional {
            self.values.insert(key.clone(), decl.default.clone());
            self.schema.insert(key, decl);
        }
        info!("Schema extended with {} new keys", count);
        Ok(())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.schema.keys().map(String::as_str)
    }

    /// Copy of every value, in schema order
    pub fn snapshot(&self) -> StateSnapshot {
        self.schema
            .keys()
            .filter_map(|key| self.values.get(key).map(|v| (key.clone(), v.clone())))
            .collect()
    }

    /// Current values of the keys that are missing from `other` or differ
    /// from it
    pub fn diff_state(&self, other: &StateSnapshot) -> StateSnapshot {
        self.snapshot()
            .into_iter()
            .filter(|(key, value)| other.get(key) != Some(value))
            .collect()
    }

    /// Write all values as pretty JSON, in schema order
    pub fn save_to_json(&self, path: impl AsRef<Path>) -> Result<(), StateError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, text)?;
        info!("State saved to {:?}", path);
        Ok(())
    }

    /// Load values from a JSON object file.
    ///
    /// Unknown keys and mistyped values are skipped with a warning. Returns
    /// the number of values applied.
    pub fn load_from_json(&mut self, path: impl AsRef<Path>) -> Result<usize, StateError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let Value::Object(data) = serde_json::from_str::<Value>(&text)? else {
            return Err(StateError::NotAnObject);
        };

        let mut loaded = 0;
        for (key, value) in data {
            match self.set_state(&key, value) {
                Ok(()) => loaded += 1,
                Err(err) => warn!("Skipping '{}' from {:?}: {}", key, path, err),
            }
        }
        info!("Loaded {} state values from {:?}", loaded, path);
        Ok(loaded)
    }

    fn validate(&self, key: &str, value: &Value) -> Result<(), StateError> {
        let decl = self.schema.get(key).ok_or_else(|| StateError::UnknownKey {
            key: key.to_string(),
        })?;

        if decl.accepts(value) {
            Ok(())
        } else {
            Err(StateError::TypeMismatch {
                key: key.to_string(),
                expected: decl.expected(),
                found: ValueKind::of(value),
            })
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = AppState::new();
        assert_eq!(state.get_state(keys::CURRENT_PAGE).unwrap(), &Value::Null);
        assert_eq!(state.get_state(keys::HISTORY_INDEX).unwrap(), &json!(-1));
        assert_eq!(state.get_state(keys::THEME).unwrap(), &json!("dark"));
    }

    #[test]
    fn test_set_state_validates_key_and_kind() {
        let mut state = AppState::new();

        state.set_state(keys::CURRENT_PAGE, "home").unwrap();
        assert_eq!(state.get_state(keys::CURRENT_PAGE).unwrap(), &json!("home"));

        assert!(matches!(
            state.set_state("nope", 1),
            Err(StateError::UnknownKey { .. })
        ));
        assert!(matches!(
            state.set_state(keys::DEBUG_MODE, "yes"),
            Err(StateError::TypeMismatch { found: ValueKind::String, .. })
        ));
        assert!(matches!(state.get_state("nope"), Err(StateError::UnknownKey { .. })));
    }

    #[test]
    fn test_update_and_reset() {
        let mut state = AppState::new();
        state
            .update_state([(keys::THEME, json!("light")), (keys::DEBUG_MODE, json!(true))])
            .unwrap();
        assert_eq!(state.get_state(keys::THEME).unwrap(), &json!("light"));

        state.reset_state();
        assert_eq!(state.get_state(keys::THEME).unwrap(), &json!("dark"));
        assert_eq!(state.get_state(keys::DEBUG_MODE).unwrap(), &json!(false));
    }

    #[test]
    fn test_defaults_are_not_shared() {
        let mut state = AppState::new();
        state
            .set_state(keys::SESSION_DATA, json!({ "user": "ada" }))
            .unwrap();

        let fresh = AppState::new();
        assert_eq!(fresh.get_state(keys::SESSION_DATA).unwrap(), &json!({}));
    }

    #[test]
    fn test_extend_schema() {
        let mut state = AppState::new();

        let mut extra = StateSchema::new();
        extra.insert("zoom".into(), StateKey::new([ValueKind::Number], 1.0));
        state.extend_schema(extra).unwrap();
        state.set_state("zoom", 2).unwrap();
        assert_eq!(state.get_state("zoom").unwrap(), &json!(2));

        let mut clash = StateSchema::new();
        clash.insert("fresh".into(), StateKey::new([ValueKind::Bool], false));
        clash.insert(keys::THEME.into(), StateKey::new([ValueKind::String], "x"));
        assert!(matches!(
            state.extend_schema(clash),
            Err(StateError::DuplicateKey { .. })
        ));
        assert!(state.get_state("fresh").is_err());
    }

    #[test]
    fn test_snapshot_and_diff() {
        let mut state = AppState::new();
        let before = state.snapshot();
        assert_eq!(before.keys().next().map(String::as_str), Some(keys::CURRENT_PAGE));
        assert_eq!(before[keys::NAVIGATION_HISTORY], json!([]));
        assert!(state.diff_state(&before).is_empty());

        state.set_state(keys::THEME, "light").unwrap();
        state.set_state(keys::HISTORY_INDEX, 0).unwrap();
        let diff = state.diff_state(&before);
        assert_eq!(diff.len(), 2);
        assert_eq!(diff[keys::THEME], json!("light"));
        assert_eq!(diff[keys::HISTORY_INDEX], json!(0));

        let mut partial = state.snapshot();
        partial.shift_remove(keys::DEBUG_MODE);
        assert_eq!(
            state.diff_state(&partial).into_iter().collect::<Vec<_>>(),
            vec![(keys::DEBUG_MODE.to_string(), json!(false))]
        );
    }

    #[test]
    fn test_json_round_trip_skips_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut state = AppState::new();
        state.set_state(keys::THEME, "light").unwrap();
        state.save_to_json(&path).unwrap();

        let mut restored = AppState::new();
        assert_eq!(restored.load_from_json(&path).unwrap(), 7);
        assert_eq!(restored.get_state(keys::THEME).unwrap(), &json!("light"));

        std::fs::write(&path, r#"{"theme": 5, "unknown": 1, "debug_mode": true}"#).unwrap();
        assert_eq!(restored.load_from_json(&path).unwrap(), 1);
        assert_eq!(restored.get_state(keys::THEME).unwrap(), &json!("light"));
        assert_eq!(restored.get_state(keys::DEBUG_MODE).unwrap(), &json!(true));

        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            restored.load_from_json(&path),
            Err(StateError::NotAnObject)
        ));
    }
}
