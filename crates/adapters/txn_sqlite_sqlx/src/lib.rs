//! # operon-adapter-txn-sqlite-sqlx
//!
//! Reference [`TransactionProvider`](operon_core::TransactionProvider) for
//! operon services: an **ambient** `SQLite` transaction over a
//! single-connection `sqlx` pool.
//!
//! The pool is capped at one connection, so `BEGIN IMMEDIATE`, the block's
//! own queries against the shared pool, and the final `COMMIT`/`ROLLBACK`
//! all serialize onto the same connection. The block never threads a
//! transaction handle around — it just runs its queries and returns a
//! [`Verdict`](operon_core::Verdict).

pub mod error;
pub mod provider;

pub use error::ProviderError;
pub use provider::{Config, SqliteTransactionProvider};
