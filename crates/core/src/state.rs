//! Service state — where an invocation sits in its lifecycle.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a single service invocation.
///
/// Every instance starts out [`Pending`](Self::Pending) and settles into
/// [`Success`](Self::Success) or [`Failed`](Self::Failed) at most once;
/// settlement is never reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    #[default]
    Pending,
    Success,
    Failed,
}

impl ServiceState {
    /// Whether the invocation has not settled yet.
    #[must_use]
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether the invocation reached a terminal state.
    #[must_use]
    pub fn is_settled(self) -> bool {
        !self.is_pending()
    }
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Success => f.write_str("success"),
            Self::Failed => f.write_str("failed"),
        }
    }
}
