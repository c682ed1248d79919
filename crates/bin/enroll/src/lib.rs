//! # enroll — operon reference application (library part)
//!
//! Everything the binary wires together, exposed as a library so the
//! integration tests can drive the full lifecycle without spawning a
//! process.

pub mod config;
pub mod operator;
pub mod services;
