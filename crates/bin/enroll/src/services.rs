//! Enrollment services — use-cases built on the operon lifecycle.

pub mod register_member;
