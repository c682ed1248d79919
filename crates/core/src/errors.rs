//! Error collection and the framework error taxonomy.
//!
//! Validation and domain errors are *data*: they accumulate in an
//! [`ErrorBag`] and drive the failed state without ever surfacing as Rust
//! errors. Everything in the [`ServiceError`] enum is the opposite — a fault
//! that propagates to the caller instead of being recorded.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Field-keyed collection of error messages for one service invocation.
///
/// Entries only accumulate. Recording a field that already holds messages
/// appends to the existing list, never overwrites it, and nothing is ever
/// removed for the lifetime of the instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorBag {
    entries: BTreeMap<String, Vec<String>>,
}

impl ErrorBag {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single message under `field`.
    pub fn record(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.entries.entry(field.into()).or_default().push(message.into());
    }

    /// Record several messages under `field`, preserving their order after
    /// any messages the field already holds.
    pub fn record_many<I, M>(&mut self, field: impl Into<String>, messages: I)
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        let slot = self.entries.entry(field.into()).or_default();
        slot.extend(messages.into_iter().map(Into::into));
    }

    /// Merge another collector into this one, field-wise and append-only.
    ///
    /// This is the idiom for copying a collaborator's errors into the
    /// service's own map, typically from a fail callback.
    pub fn merge(&mut self, other: &ErrorBag) {
        for (field, messages) in &other.entries {
            self.entries
                .entry(field.clone())
                .or_default()
                .extend(messages.iter().cloned());
        }
    }

    /// Record a JSON payload of `field -> message | [messages]`.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedErrorPayload`] when the payload is not an object
    /// or a field's value is not a string or array of strings. Nothing is
    /// recorded in that case — a malformed payload is a programmer error,
    /// not a domain error.
    pub fn record_value(&mut self, payload: &Value) -> Result<(), MalformedErrorPayload> {
        let Some(object) = payload.as_object() else {
            return Err(MalformedErrorPayload::NotAnObject);
        };

        let mut staged: Vec<(&str, Vec<String>)> = Vec::with_capacity(object.len());
        for (field, value) in object {
            let messages = match value {
                Value::String(message) => vec![message.clone()],
                Value::Array(items) => {
                    let mut messages = Vec::with_capacity(items.len());
                    for item in items {
                        let Value::String(message) = item else {
                            return Err(MalformedErrorPayload::NotMessages {
                                field: field.clone(),
                            });
                        };
                        messages.push(message.clone());
                    }
                    messages
                }
                _ => {
                    return Err(MalformedErrorPayload::NotMessages {
                        field: field.clone(),
                    });
                }
            };
            staged.push((field, messages));
        }

        for (field, messages) in staged {
            self.record_many(field, messages);
        }
        Ok(())
    }

    /// Whether any message has been recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Whether the collector is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of fields holding at least one message.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Messages recorded under `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.entries.get(field).map(Vec::as_slice)
    }

    /// Iterate over `(field, messages)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

/// A structurally invalid error payload.
///
/// This is a programmer error: it propagates immediately and is never
/// recorded as a domain error.
#[derive(Debug, thiserror::Error)]
pub enum MalformedErrorPayload {
    /// The payload was not a JSON object.
    #[error("error payload must be a JSON object")]
    NotAnObject,
    /// A field's value was neither a string nor an array of strings.
    #[error("messages for field '{field}' must be a string or an array of strings")]
    NotMessages {
        /// Field whose value was rejected.
        field: String,
    },
}

/// Failure reading an argument accessor.
#[derive(Debug, thiserror::Error)]
pub enum ArgumentError {
    /// The name is not exposed on this instance — either never supplied, or
    /// supplied but absent from the declared schema.
    #[error("unknown argument '{0}'")]
    Unknown(String),
    /// The value exists but does not deserialize into the requested type.
    #[error("argument '{name}' has an unexpected shape")]
    Malformed {
        /// Argument that failed to deserialize.
        name: String,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },
}

/// Faults that surface out of a service's `execute`.
///
/// None of these represent a normal failed settlement; they are the
/// conditions the lifecycle refuses to absorb.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Reading an argument accessor failed.
    #[error("argument error")]
    Argument(#[from] ArgumentError),

    /// Recording a structurally invalid error payload.
    #[error("malformed error payload")]
    ErrorPayload(#[from] MalformedErrorPayload),

    /// The transaction provider itself failed (begin, commit or rollback).
    #[error("transaction provider failure")]
    Transaction(#[source] BoxedError),

    /// An unexpected fault raised by the service body.
    #[error("service body fault")]
    Domain(#[source] BoxedError),

    /// A success/fail callback raised.
    #[error("callback '{name}' failed")]
    Callback {
        /// Label of the offending callback, or `"anonymous"` for closures.
        name: &'static str,
        /// The error the callback returned.
        #[source]
        source: BoxedError,
    },
}

impl ServiceError {
    /// Wrap an unexpected body fault.
    pub fn domain(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Domain(Box::new(err))
    }
}
