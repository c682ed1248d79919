//! Compiled schemas — field rules turned into a reusable validator handle.

use std::fmt;

use serde_json::{Map, Value};

use operon_core::ports::validator::{SchemaHandle, ValidationReport};

use crate::rule::FieldRule;

const IS_MISSING: &str = "is missing";
const MUST_BE_FILLED: &str = "must be filled";

/// Compilation errors for a schema declaration.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Two rules declare the same field.
    #[error("field '{key}' is declared twice")]
    DuplicateField {
        /// The duplicated field name.
        key: String,
    },
}

/// Builder collecting field rules into a [`Schema`].
pub struct SchemaBuilder<C> {
    rules: Vec<FieldRule<C>>,
}

impl<C> Default for SchemaBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SchemaBuilder<C> {
    /// Start an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Declare a field rule. Declaration order is preserved and becomes
    /// the order of [`declared_fields`](SchemaHandle::declared_fields).
    #[must_use]
    pub fn field(mut self, rule: FieldRule<C>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Compile the collected rules.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateField`] when two rules declare the
    /// same field name.
    pub fn build(self) -> Result<Schema<C>, SchemaError> {
        let mut declared = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            if declared.contains(&rule.key) {
                return Err(SchemaError::DuplicateField {
                    key: rule.key.clone(),
                });
            }
            declared.push(rule.key.clone());
        }
        Ok(Schema {
            rules: self.rules,
            declared,
        })
    }
}

/// A compiled, immutable schema.
///
/// Implements the core's [`SchemaHandle`] port, so it can be attached to a
/// service type's descriptor directly or shared between types via `Arc`.
pub struct Schema<C> {
    rules: Vec<FieldRule<C>>,
    declared: Vec<String>,
}

impl<C> Schema<C> {
    /// Start building a schema.
    #[must_use]
    pub fn builder() -> SchemaBuilder<C> {
        SchemaBuilder::new()
    }
}

impl<C> fmt::Debug for Schema<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("declared", &self.declared).finish_non_exhaustive()
    }
}

fn is_blank(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.trim().is_empty())
}

impl<C> SchemaHandle<C> for Schema<C> {
    fn declared_fields(&self) -> &[String] {
        &self.declared
    }

    fn run(&self, raw: &Map<String, Value>, context: &C) -> ValidationReport {
        let mut report = ValidationReport::default();

        for rule in &self.rules {
            // Absent and explicit null are equivalent for presence checks;
            // "must be filled" is reserved for keys that were supplied.
            let Some(value) = raw.get(&rule.key).filter(|value| !value.is_null()) else {
                if rule.required {
                    let message = if raw.contains_key(&rule.key) {
                        MUST_BE_FILLED
                    } else {
                        IS_MISSING
                    };
                    report
                        .errors
                        .entry(rule.key.clone())
                        .or_default()
                        .push(message.to_string());
                }
                continue;
            };

            if rule.filled && is_blank(value) {
                report
                    .errors
                    .entry(rule.key.clone())
                    .or_default()
                    .push(MUST_BE_FILLED.to_string());
                continue;
            }

            let mut coerced = match rule.kind {
                None => value.clone(),
                Some(kind) => match kind.coerce(value) {
                    Some(coerced) => coerced,
                    None => {
                        report
                            .errors
                            .entry(rule.key.clone())
                            .or_default()
                            .push(kind.message().to_string());
                        continue;
                    }
                },
            };

            if rule.trimmed {
                if let Value::String(s) = &coerced {
                    coerced = Value::String(s.trim().to_string());
                }
            }

            let mut passed = true;
            for predicate in &rule.checks {
                if !(predicate.test)(&coerced, context) {
                    report
                        .errors
                        .entry(rule.key.clone())
                        .or_default()
                        .push(predicate.message.clone());
                    passed = false;
                }
            }
            if passed {
                report.output.insert(rule.key.clone(), coerced);
            }
        }

        report
    }
}
