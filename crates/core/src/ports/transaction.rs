//! Transaction port — the provider contract for transactional execution.

use std::error::Error as StdError;
use std::future::Future;

use crate::errors::ServiceError;

/// Explicit outcome of a transactional block.
///
/// The block decides the fate of the transaction by returning a verdict
/// rather than a truthy value: [`Commit`](Self::Commit) carries the block's
/// result out of the transaction, [`Rollback`](Self::Rollback) asks the
/// provider to discard the transaction without raising anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<T> {
    /// Commit the transaction and surface the carried value.
    Commit(T),
    /// Roll the transaction back as a normal, non-exceptional outcome.
    Rollback,
}

/// Failure modes of a transactional run.
#[derive(Debug, thiserror::Error)]
pub enum TransactionFault<P>
where
    P: StdError + 'static,
{
    /// The provider failed to begin, commit, or roll back.
    #[error("transaction provider failure")]
    Provider(#[source] P),
    /// The block itself raised. The provider rolled the transaction back
    /// before surfacing this.
    #[error("transactional block fault")]
    Work(#[source] ServiceError),
}

/// External capability that brackets a block of work in a transaction.
///
/// Contract: commit iff the block resolves [`Verdict::Commit`]; roll back
/// without raising on [`Verdict::Rollback`]; on a block error roll back
/// first, then surface the error unchanged as [`TransactionFault::Work`].
/// The provider must never translate a block error into a verdict.
///
/// The returned future carries no `Send` bound on the block: a service
/// instance runs its whole lifecycle on one task.
pub trait TransactionProvider {
    /// Provider-level failure type (connection loss, commit failure, ...).
    type Fault: StdError + Send + Sync + 'static;

    /// Run `work` inside one transaction.
    fn run_in_transaction<T, F, Fut>(
        &self,
        work: F,
    ) -> impl Future<Output = Result<Verdict<T>, TransactionFault<Self::Fault>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Verdict<T>, ServiceError>>;
}
