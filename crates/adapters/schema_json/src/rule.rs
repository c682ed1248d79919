//! Field rules — the per-field constraints a schema is compiled from.

use std::fmt;

use serde_json::Value;

/// Expected shape of a field value.
///
/// Kinds coerce where a conversion is unambiguous: integers, numbers and
/// booleans also accept their string spellings, so form-style input maps
/// validate without a separate parsing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl Kind {
    /// Message recorded when a value does not match this kind.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::String => "must be a string",
            Self::Integer => "must be an integer",
            Self::Number => "must be a number",
            Self::Boolean => "must be a boolean",
            Self::Object => "must be an object",
            Self::Array => "must be an array",
        }
    }

    /// Check `value` against this kind, returning the coerced value.
    #[must_use]
    pub fn coerce(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::String, Value::String(_))
            | (Self::Number, Value::Number(_))
            | (Self::Boolean, Value::Bool(_))
            | (Self::Object, Value::Object(_))
            | (Self::Array, Value::Array(_)) => Some(value.clone()),
            (Self::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => Some(value.clone()),
            (Self::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
            (Self::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            (Self::Boolean, Value::String(s)) => match s.trim() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        }
    }
}

pub(crate) struct Predicate<C> {
    pub(crate) message: String,
    pub(crate) test: Box<dyn Fn(&Value, &C) -> bool + Send + Sync>,
}

/// Constraints for one declared field.
///
/// Built fluently and handed to [`SchemaBuilder::field`](crate::SchemaBuilder::field):
///
/// ```
/// use operon_adapter_schema_json::{FieldRule, Kind};
///
/// let rule: FieldRule<()> = FieldRule::required("email")
///     .kind(Kind::String)
///     .trimmed()
///     .ensure("must contain '@'", |value, _ctx| {
///         value.as_str().is_some_and(|s| s.contains('@'))
///     });
/// ```
pub struct FieldRule<C> {
    pub(crate) key: String,
    pub(crate) required: bool,
    pub(crate) filled: bool,
    pub(crate) trimmed: bool,
    pub(crate) kind: Option<Kind>,
    pub(crate) checks: Vec<Predicate<C>>,
}

impl<C> FieldRule<C> {
    /// A field that must be present and non-null.
    #[must_use]
    pub fn required(key: impl Into<String>) -> Self {
        Self::new(key, true)
    }

    /// A field that may be absent or null; rules apply only when a value
    /// is supplied.
    #[must_use]
    pub fn optional(key: impl Into<String>) -> Self {
        Self::new(key, false)
    }

    fn new(key: impl Into<String>, required: bool) -> Self {
        Self {
            key: key.into(),
            required,
            filled: false,
            trimmed: false,
            kind: None,
            checks: Vec::new(),
        }
    }

    /// Reject blank values (strings that are empty after trimming).
    #[must_use]
    pub fn filled(mut self) -> Self {
        self.filled = true;
        self
    }

    /// Trim surrounding whitespace from string output.
    #[must_use]
    pub fn trimmed(mut self) -> Self {
        self.trimmed = true;
        self
    }

    /// Constrain the value to `kind`, coercing where unambiguous.
    #[must_use]
    pub fn kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Add a custom predicate over the coerced value and the ambient
    /// context. `message` is recorded when the predicate returns false.
    #[must_use]
    pub fn ensure<F>(mut self, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value, &C) -> bool + Send + Sync + 'static,
    {
        self.checks.push(Predicate {
            message: message.into(),
            test: Box::new(predicate),
        });
        self
    }

    /// The declared field name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<C> fmt::Debug for FieldRule<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("key", &self.key)
            .field("required", &self.required)
            .field("filled", &self.filled)
            .field("trimmed", &self.trimmed)
            .field("kind", &self.kind)
            .field("checks", &self.checks.len())
            .finish()
    }
}
