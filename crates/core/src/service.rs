//! Service trait — the public lifecycle surface every service type gets.
//!
//! Implementors supply the type descriptor, access to the embedded
//! [`Lifecycle`], and the body in [`call`](Service::call). Everything else —
//! execution, transactional wrapping, settlement, predicates, accessors and
//! callback dispatch — is provided.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::arguments::BoundArguments;
use crate::descriptor::{Descriptor, HookEvent};
use crate::errors::{ArgumentError, ErrorBag, ServiceError};
use crate::id::InvocationId;
use crate::lifecycle::Lifecycle;
use crate::ports::transaction::{TransactionFault, TransactionProvider, Verdict};
use crate::state::ServiceState;
use crate::time::Timestamp;

/// One encapsulated unit of business logic with a uniform lifecycle:
/// construct with context and arguments, validate against the type's
/// schema, execute, settle exactly once, run the matching callbacks.
pub trait Service: Sized {
    /// Opaque acting principal, readable by the body and by schema rules.
    type Context;

    /// The type's immutable descriptor (schema binding + callback registry).
    fn descriptor() -> &'static Descriptor<Self>;

    /// Borrow the embedded lifecycle state.
    fn lifecycle(&self) -> &Lifecycle<Self::Context>;

    /// Mutably borrow the embedded lifecycle state.
    fn lifecycle_mut(&mut self) -> &mut Lifecycle<Self::Context>;

    /// The service body. Runs at most once per instance, and never on an
    /// instance whose validation failed.
    fn call(&mut self) -> impl Future<Output = Result<(), ServiceError>>;

    /// Drive the lifecycle: run the body while still pending, then dispatch
    /// the callbacks matching the settled state, exactly once.
    ///
    /// A body fault propagates before any callback runs; callbacks only
    /// ever observe a settled instance, outside any transactional scope.
    ///
    /// # Errors
    ///
    /// Propagates body faults unchanged and callback faults wrapped as
    /// [`ServiceError::Callback`].
    fn execute(&mut self) -> impl Future<Output = Result<(), ServiceError>>
    where
        Self: 'static,
    {
        async move {
            if self.lifecycle().state().is_pending() {
                self.call().await?;
            }
            dispatch_hooks(self)
        }
    }

    /// Run `work` inside `provider`'s transaction and settle from its
    /// verdict: [`Verdict::Commit`] commits and settles success, carrying
    /// the committed value out; [`Verdict::Rollback`] rolls back as a
    /// normal outcome and settles failed.
    ///
    /// Short-circuits to `Ok(None)` without touching the provider unless
    /// the instance is still pending, so a validation-failed instance never
    /// opens a transaction.
    ///
    /// # Errors
    ///
    /// A `work` error leaves the state unsettled and propagates unchanged
    /// after the provider rolls back; provider infrastructure failures
    /// surface as [`ServiceError::Transaction`].
    fn within_transaction<P, T, F>(
        &mut self,
        provider: &P,
        work: F,
    ) -> impl Future<Output = Result<Option<T>, ServiceError>>
    where
        P: TransactionProvider,
        F: AsyncFnOnce(&mut Self) -> Result<Verdict<T>, ServiceError>,
    {
        async move {
            if !self.lifecycle().state().is_pending() {
                return Ok(None);
            }
            match provider.run_in_transaction(|| work(&mut *self)).await {
                Ok(Verdict::Commit(value)) => {
                    self.lifecycle_mut().succeed();
                    Ok(Some(value))
                }
                Ok(Verdict::Rollback) => {
                    self.lifecycle_mut().fail();
                    Ok(None)
                }
                Err(TransactionFault::Provider(fault)) => {
                    Err(ServiceError::Transaction(Box::new(fault)))
                }
                Err(TransactionFault::Work(err)) => Err(err),
            }
        }
    }

    /// Manually settle into success. First transition wins.
    fn succeed(&mut self) {
        self.lifecycle_mut().succeed();
    }

    /// Manually settle into failed. First transition wins.
    fn fail(&mut self) {
        self.lifecycle_mut().fail();
    }

    /// Current lifecycle state.
    #[must_use]
    fn state(&self) -> ServiceState {
        self.lifecycle().state()
    }

    /// Whether the instance settled into success.
    #[must_use]
    fn succeeded(&self) -> bool {
        self.state() == ServiceState::Success
    }

    /// Whether the instance settled into failed.
    #[must_use]
    fn failed(&self) -> bool {
        self.state() == ServiceState::Failed
    }

    /// The accumulated errors.
    #[must_use]
    fn errors(&self) -> &ErrorBag {
        self.lifecycle().errors()
    }

    /// Mutable access to the error collector.
    fn errors_mut(&mut self) -> &mut ErrorBag {
        self.lifecycle_mut().errors_mut()
    }

    /// Whether any error has been recorded.
    #[must_use]
    fn has_errors(&self) -> bool {
        self.errors().has_errors()
    }

    /// Record a single message under `field`.
    fn record_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors_mut().record(field, message);
    }

    /// The acting principal supplied at construction.
    #[must_use]
    fn context(&self) -> &Self::Context {
        self.lifecycle().context()
    }

    /// The bound arguments of record.
    #[must_use]
    fn arguments(&self) -> &BoundArguments {
        self.lifecycle().arguments()
    }

    /// Read the argument bound under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::Unknown`] for a name outside the exposed
    /// set (see [`BoundArguments::get`]).
    fn arg(&self, name: &str) -> Result<&Value, ArgumentError> {
        self.arguments().get(name)
    }

    /// Read and deserialize the argument bound under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::Unknown`] for an unexposed name, or
    /// [`ArgumentError::Malformed`] on a type mismatch.
    fn arg_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, ArgumentError> {
        self.arguments().get_as(name)
    }

    /// Identifier of this invocation.
    #[must_use]
    fn invocation(&self) -> InvocationId {
        self.lifecycle().invocation()
    }

    /// When the instance settled, if it has.
    #[must_use]
    fn settled_at(&self) -> Option<Timestamp> {
        self.lifecycle().settled_at()
    }
}

/// Run the hook list matching the settled state.
///
/// The dispatched flag flips before the first handler runs, so a faulting
/// hook list never runs twice.
fn dispatch_hooks<S: Service + 'static>(service: &mut S) -> Result<(), ServiceError> {
    let event = match service.lifecycle().state() {
        ServiceState::Success => HookEvent::Success,
        ServiceState::Failed => HookEvent::Fail,
        ServiceState::Pending => return Ok(()),
    };
    if !service.lifecycle_mut().begin_hook_dispatch() {
        return Ok(());
    }
    for hook in S::descriptor().hooks().for_event(event) {
        tracing::trace!(
            invocation = %service.lifecycle().invocation(),
            hook = hook.label(),
            "dispatching callback"
        );
        hook.invoke(service).map_err(|source| ServiceError::Callback {
            name: hook.label(),
            source: Box::new(source),
        })?;
    }
    Ok(())
}
