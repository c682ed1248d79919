//! # operon-adapter-schema-json
//!
//! Reference validator for operon services: declarative per-field rules
//! (required/optional, filled, kind predicates with light coercion, custom
//! context-aware checks) compiled into a reusable [`Schema`] implementing
//! the core's [`SchemaHandle`](operon_core::SchemaHandle) port.
//!
//! A schema is built once, attached to a service type's descriptor (or
//! shared between several types via `Arc`), and run against the raw
//! argument map at construction time. Output contains only declared fields
//! with coerced values; everything else in the input is dropped.

pub mod rule;
pub mod schema;

pub use rule::{FieldRule, Kind};
pub use schema::{Schema, SchemaBuilder, SchemaError};
