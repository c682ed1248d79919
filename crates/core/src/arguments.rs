//! Argument binding — named read access over one invocation's arguments.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::ArgumentError;

static NULL: Value = Value::Null;

/// Read-only view over the arguments of one service invocation.
///
/// The set of readable names is fixed when the instance is constructed:
/// every supplied key when the service type declares no schema, or exactly
/// the schema's declared fields otherwise. Keys outside that set are
/// accepted at construction but can never be read back, so execution logic
/// cannot accidentally depend on an unvalidated field.
#[derive(Debug, Clone)]
pub struct BoundArguments {
    values: Map<String, Value>,
    exposed: BTreeSet<String>,
}

impl BoundArguments {
    /// Bind raw arguments with every supplied key exposed (no schema).
    #[must_use]
    pub fn all(values: Map<String, Value>) -> Self {
        let exposed = values.keys().cloned().collect();
        Self { values, exposed }
    }

    /// Bind arguments with only the schema-declared fields exposed.
    ///
    /// `values` is the sanitized validator output after a successful run, or
    /// the raw arguments when validation rejected them.
    #[must_use]
    pub fn schema_only(values: Map<String, Value>, declared: &[String]) -> Self {
        let exposed = declared.iter().cloned().collect();
        Self { values, exposed }
    }

    /// Read the value bound under `name`.
    ///
    /// An exposed name with no stored value reads as JSON `null` (a schema
    /// field the validator left absent).
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::Unknown`] when `name` is not exposed on this
    /// instance.
    pub fn get(&self, name: &str) -> Result<&Value, ArgumentError> {
        if !self.exposed.contains(name) {
            return Err(ArgumentError::Unknown(name.to_string()));
        }
        Ok(self.values.get(name).unwrap_or(&NULL))
    }

    /// Read and deserialize the value bound under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::Unknown`] for an unexposed name, or
    /// [`ArgumentError::Malformed`] when the value does not deserialize
    /// into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, ArgumentError> {
        let value = self.get(name)?.clone();
        serde_json::from_value(value).map_err(|source| ArgumentError::Malformed {
            name: name.to_string(),
            source,
        })
    }

    /// Whether `name` is exposed on this instance.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.exposed.contains(name)
    }

    /// Exposed names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.exposed.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
    }

    #[test]
    fn should_expose_every_key_when_bound_without_schema() {
        let args = BoundArguments::all(raw(&[("title", json!("hello")), ("count", json!(3))]));

        assert_eq!(args.get("title").unwrap(), &json!("hello"));
        assert_eq!(args.get("count").unwrap(), &json!(3));
        assert_eq!(args.names().collect::<Vec<_>>(), ["count", "title"]);
    }

    #[test]
    fn should_return_unknown_for_name_never_supplied() {
        let args = BoundArguments::all(raw(&[("title", json!("hello"))]));
        let result = args.get("subtitle");

        assert!(matches!(result, Err(ArgumentError::Unknown(name)) if name == "subtitle"));
    }

    #[test]
    fn should_hide_keys_outside_declared_fields() {
        let values = raw(&[("email", json!("a@b.c")), ("admin", json!(true))]);
        let args = BoundArguments::schema_only(values, &["email".to_string()]);

        assert_eq!(args.get("email").unwrap(), &json!("a@b.c"));
        assert!(matches!(args.get("admin"), Err(ArgumentError::Unknown(_))));
        assert!(!args.contains("admin"));
    }

    #[test]
    fn should_read_null_for_exposed_but_absent_field() {
        let args = BoundArguments::schema_only(Map::new(), &["email".to_string()]);
        assert_eq!(args.get("email").unwrap(), &Value::Null);
    }

    #[test]
    fn should_deserialize_typed_values() {
        let args = BoundArguments::all(raw(&[("count", json!(3))]));
        let count: u32 = args.get_as("count").unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn should_report_malformed_when_type_does_not_match() {
        let args = BoundArguments::all(raw(&[("count", json!("three"))]));
        let result: Result<u32, _> = args.get_as("count");

        assert!(matches!(result, Err(ArgumentError::Malformed { name, .. }) if name == "count"));
    }

    #[test]
    fn should_read_optional_fields_as_none_when_null() {
        let args = BoundArguments::schema_only(Map::new(), &["nickname".to_string()]);
        let nickname: Option<String> = args.get_as("nickname").unwrap();
        assert_eq!(nickname, None);
    }
}
