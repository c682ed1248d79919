//! Operator — the acting principal behind an enrollment.
//!
//! Passed to services as ambient context: schema rules and bodies can read
//! it, but it is never a validated field itself.

/// The person (or automation) performing an enrollment.
#[derive(Debug, Clone)]
pub struct Operator {
    /// Display name, used in log events.
    pub name: String,
    /// Whether administrator-only fields are allowed.
    pub admin: bool,
}
