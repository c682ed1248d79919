//! Provider-specific error type wrapping sqlx errors.

/// Errors originating from the `SQLite` transaction provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),
}
