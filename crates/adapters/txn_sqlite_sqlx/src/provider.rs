//! `SQLite` transaction provider — pool setup and the provider itself.

use std::future::Future;
use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use operon_core::errors::ServiceError;
use operon_core::ports::transaction::{TransactionFault, TransactionProvider, Verdict};

use crate::error::ProviderError;

/// Configuration for the `SQLite` transaction provider.
pub struct Config {
    /// `SQLite` connection URL (e.g. `sqlite:operon.db` or `sqlite::memory:`).
    pub database_url: String,
}

impl Config {
    /// Build a [`SqliteTransactionProvider`] from this configuration.
    ///
    /// Creates the database file if missing and opens a pool capped at one
    /// connection, which is what makes the transaction ambient.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the URL is invalid or the connection
    /// fails.
    pub async fn build(self) -> Result<SqliteTransactionProvider, ProviderError> {
        let options = SqliteConnectOptions::from_str(&self.database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(SqliteTransactionProvider { pool })
    }
}

/// Ambient `SQLite` transaction provider.
///
/// Cheap to clone; clones share the same single-connection pool.
#[derive(Clone)]
pub struct SqliteTransactionProvider {
    pool: SqlitePool,
}

impl SqliteTransactionProvider {
    /// Wrap an existing pool.
    ///
    /// The pool must serialize onto a single connection, otherwise the
    /// block's queries may run outside the transaction.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Borrow the underlying connection pool for the block's own queries.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn begin(&self) -> Result<(), ProviderError> {
        sqlx::query("BEGIN IMMEDIATE").execute(&self.pool).await?;
        Ok(())
    }

    async fn commit(&self) -> Result<(), ProviderError> {
        sqlx::query("COMMIT").execute(&self.pool).await?;
        Ok(())
    }

    async fn rollback(&self) -> Result<(), ProviderError> {
        sqlx::query("ROLLBACK").execute(&self.pool).await?;
        Ok(())
    }
}

impl TransactionProvider for SqliteTransactionProvider {
    type Fault = ProviderError;

    async fn run_in_transaction<T, F, Fut>(
        &self,
        work: F,
    ) -> Result<Verdict<T>, TransactionFault<ProviderError>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Verdict<T>, ServiceError>>,
    {
        self.begin().await.map_err(TransactionFault::Provider)?;
        match work().await {
            Ok(Verdict::Commit(value)) => {
                self.commit().await.map_err(TransactionFault::Provider)?;
                tracing::debug!("transaction committed");
                Ok(Verdict::Commit(value))
            }
            Ok(Verdict::Rollback) => {
                self.rollback().await.map_err(TransactionFault::Provider)?;
                tracing::debug!("transaction rolled back");
                Ok(Verdict::Rollback)
            }
            Err(err) => {
                // Unwind the transaction before surfacing the block's fault.
                if let Err(rollback_err) = self.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback after block fault failed");
                }
                Err(TransactionFault::Work(err))
            }
        }
    }
}
