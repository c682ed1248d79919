//! # operon-core
//!
//! Lifecycle framework for **services** — single units of business logic
//! with a uniform contract: construct with context and arguments, validate
//! against the type's declared schema, execute (optionally inside a
//! transaction), settle into success or failed exactly once, then run the
//! callbacks registered for that outcome.
//!
//! ## Responsibilities
//! - The execution state machine ([`Lifecycle`], [`Service`],
//!   [`ServiceState`]): pending → success/failed, idempotent settlement,
//!   exactly-once callback dispatch outside any transactional scope
//! - The error collector ([`ErrorBag`]): field-keyed, append-only,
//!   merge-without-clobber
//! - The argument binder ([`BoundArguments`]): named read access fixed at
//!   construction, restricted to schema-declared fields when a schema exists
//! - The per-type descriptor ([`Descriptor`], [`Hooks`]): one optional
//!   schema and the ordered success/fail callback lists, built once and
//!   shared read-only by every instance
//! - **Port definitions** the framework consumes
//!   ([`SchemaHandle`], [`TransactionProvider`])
//!
//! ## Dependency rule
//! This crate has no internal dependencies and performs no IO. Validators
//! and transaction providers are adapter crates implementing the port
//! traits; they depend on *this* crate, never the reverse.

pub mod arguments;
pub mod descriptor;
pub mod errors;
pub mod id;
pub mod lifecycle;
pub mod ports;
pub mod service;
pub mod state;
pub mod time;

pub use arguments::BoundArguments;
pub use descriptor::{Descriptor, DescriptorBuilder, Hook, HookEvent, Hooks};
pub use errors::{ArgumentError, ErrorBag, MalformedErrorPayload, ServiceError};
pub use id::InvocationId;
pub use lifecycle::Lifecycle;
pub use ports::transaction::{TransactionFault, TransactionProvider, Verdict};
pub use ports::validator::{SchemaHandle, ValidationReport};
pub use service::Service;
pub use state::ServiceState;
