//! Validator port — compiled schema handles consumed by the lifecycle.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Outcome of running a compiled schema against raw arguments.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Sanitized and coerced values for the declared fields that passed.
    /// On failure this may hold partial output; the lifecycle discards it.
    pub output: Map<String, Value>,
    /// Field-keyed messages for everything that did not pass.
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationReport {
    /// Whether validation produced no errors.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A compiled, reusable input schema for a service type.
///
/// A handle is built once, attached to the type's descriptor, and shared by
/// every instance of that type, so implementations must be immutable. The
/// ambient context is handed to [`run`](Self::run) as an auxiliary input so
/// rules can reference the acting principal without it being a validated
/// field.
pub trait SchemaHandle<C>: Send + Sync {
    /// Names of the fields this schema declares, in declaration order.
    ///
    /// These become the only argument names readable on instances of the
    /// declaring type.
    fn declared_fields(&self) -> &[String];

    /// Validate `raw` arguments, producing sanitized output or errors.
    fn run(&self, raw: &Map<String, Value>, context: &C) -> ValidationReport;
}
