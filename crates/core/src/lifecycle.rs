//! Execution state machine — the per-invocation lifecycle core.
//!
//! Concrete services embed a [`Lifecycle`] and reach it through the
//! [`Service`](crate::service::Service) trait. Construction runs the type's
//! schema binding; everything afterwards is driven by `execute`.

use serde_json::{Map, Value};

use crate::arguments::BoundArguments;
use crate::errors::ErrorBag;
use crate::id::InvocationId;
use crate::service::Service;
use crate::state::ServiceState;
use crate::time::{self, Timestamp};

/// Mutable lifecycle state embedded in every service instance.
///
/// One value per invocation, never reused: a fresh instance means fresh
/// state and a fresh error collector.
#[derive(Debug)]
pub struct Lifecycle<C> {
    context: C,
    arguments: BoundArguments,
    state: ServiceState,
    errors: ErrorBag,
    invocation: InvocationId,
    settled_at: Option<Timestamp>,
    hooks_dispatched: bool,
}

impl<C> Lifecycle<C> {
    /// Bind `context` and `raw` arguments for service type `S`, running the
    /// type's schema when one is declared.
    ///
    /// With no schema the raw arguments pass through unchanged and every
    /// supplied key becomes readable. A schema that accepts the input
    /// replaces the arguments of record with its sanitized output. A schema
    /// that rejects the input settles the instance as failed on the spot:
    /// the report's errors are recorded, the raw values stay readable for
    /// the declared fields, and any partial validator output is discarded.
    #[must_use]
    pub fn initialize<S>(context: C, raw: Map<String, Value>) -> Self
    where
        S: Service<Context = C> + 'static,
    {
        let invocation = InvocationId::new();
        let Some(schema) = S::descriptor().schema() else {
            return Self::assemble(context, BoundArguments::all(raw), invocation);
        };

        let report = schema.run(&raw, &context);
        let declared = schema.declared_fields();
        if report.is_success() {
            tracing::debug!(invocation = %invocation, "arguments validated");
            return Self::assemble(
                context,
                BoundArguments::schema_only(report.output, declared),
                invocation,
            );
        }

        tracing::warn!(
            invocation = %invocation,
            fields = report.errors.len(),
            "schema validation rejected arguments"
        );
        let mut lifecycle =
            Self::assemble(context, BoundArguments::schema_only(raw, declared), invocation);
        for (field, messages) in report.errors {
            lifecycle.errors.record_many(field, messages);
        }
        lifecycle.fail();
        lifecycle
    }

    fn assemble(context: C, arguments: BoundArguments, invocation: InvocationId) -> Self {
        Self {
            context,
            arguments,
            state: ServiceState::Pending,
            errors: ErrorBag::new(),
            invocation,
            settled_at: None,
            hooks_dispatched: false,
        }
    }

    /// The acting principal supplied at construction.
    #[must_use]
    pub fn context(&self) -> &C {
        &self.context
    }

    /// The bound arguments of record.
    #[must_use]
    pub fn arguments(&self) -> &BoundArguments {
        &self.arguments
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// The accumulated errors.
    #[must_use]
    pub fn errors(&self) -> &ErrorBag {
        &self.errors
    }

    /// Mutable access to the error collector (append-only by its own API).
    pub fn errors_mut(&mut self) -> &mut ErrorBag {
        &mut self.errors
    }

    /// Identifier of this invocation.
    #[must_use]
    pub fn invocation(&self) -> InvocationId {
        self.invocation
    }

    /// When the instance settled, if it has.
    #[must_use]
    pub fn settled_at(&self) -> Option<Timestamp> {
        self.settled_at
    }

    /// Settle into success. First transition wins; no-op once settled.
    pub fn succeed(&mut self) {
        self.settle(ServiceState::Success);
    }

    /// Settle into failed. First transition wins; no-op once settled.
    pub fn fail(&mut self) {
        self.settle(ServiceState::Failed);
    }

    fn settle(&mut self, terminal: ServiceState) {
        if self.state.is_settled() {
            return;
        }
        self.state = terminal;
        self.settled_at = Some(time::now());
        tracing::debug!(invocation = %self.invocation, state = %terminal, "service settled");
    }

    /// Flip the dispatched flag, returning whether this call was the first.
    pub(crate) fn begin_hook_dispatch(&mut self) -> bool {
        if self.hooks_dispatched {
            return false;
        }
        self.hooks_dispatched = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use serde_json::json;

    use super::*;
    use crate::descriptor::Descriptor;
    use crate::errors::ServiceError;
    use crate::ports::validator::{SchemaHandle, ValidationReport};

    struct Plain {
        lifecycle: Lifecycle<()>,
    }

    static PLAIN_DESCRIPTOR: LazyLock<Descriptor<Plain>> =
        LazyLock::new(|| Descriptor::builder().build());

    impl Service for Plain {
        type Context = ();

        fn descriptor() -> &'static Descriptor<Self> {
            &PLAIN_DESCRIPTOR
        }

        fn lifecycle(&self) -> &Lifecycle<()> {
            &self.lifecycle
        }

        fn lifecycle_mut(&mut self) -> &mut Lifecycle<()> {
            &mut self.lifecycle
        }

        async fn call(&mut self) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    struct TitleSchema;

    impl SchemaHandle<()> for TitleSchema {
        fn declared_fields(&self) -> &[String] {
            static FIELDS: LazyLock<Vec<String>> = LazyLock::new(|| vec!["title".to_string()]);
            &FIELDS
        }

        fn run(&self, raw: &Map<String, Value>, _context: &()) -> ValidationReport {
            let mut report = ValidationReport::default();
            match raw.get("title") {
                Some(Value::String(title)) if !title.is_empty() => {
                    report
                        .output
                        .insert("title".to_string(), Value::String(title.to_uppercase()));
                }
                _ => {
                    report
                        .errors
                        .insert("title".to_string(), vec!["must be filled".to_string()]);
                }
            }
            report
        }
    }

    struct Titled {
        lifecycle: Lifecycle<()>,
    }

    static TITLED_DESCRIPTOR: LazyLock<Descriptor<Titled>> =
        LazyLock::new(|| Descriptor::builder().schema(TitleSchema).build());

    impl Service for Titled {
        type Context = ();

        fn descriptor() -> &'static Descriptor<Self> {
            &TITLED_DESCRIPTOR
        }

        fn lifecycle(&self) -> &Lifecycle<()> {
            &self.lifecycle
        }

        fn lifecycle_mut(&mut self) -> &mut Lifecycle<()> {
            &mut self.lifecycle
        }

        async fn call(&mut self) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    fn raw(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
    }

    #[test]
    fn should_start_pending_with_empty_errors() {
        let lifecycle = Lifecycle::initialize::<Plain>((), raw(&[("anything", json!(1))]));

        assert!(lifecycle.state().is_pending());
        assert!(lifecycle.errors().is_empty());
        assert!(lifecycle.settled_at().is_none());
    }

    #[test]
    fn should_expose_raw_arguments_when_no_schema_declared() {
        let lifecycle = Lifecycle::initialize::<Plain>((), raw(&[("anything", json!(1))]));
        assert_eq!(lifecycle.arguments().get("anything").unwrap(), &json!(1));
    }

    #[test]
    fn should_adopt_sanitized_output_when_schema_accepts() {
        let lifecycle = Lifecycle::initialize::<Titled>((), raw(&[("title", json!("hello"))]));

        assert!(lifecycle.state().is_pending());
        assert_eq!(lifecycle.arguments().get("title").unwrap(), &json!("HELLO"));
    }

    #[test]
    fn should_settle_failed_and_record_errors_when_schema_rejects() {
        let lifecycle = Lifecycle::initialize::<Titled>((), raw(&[("title", json!(""))]));

        assert_eq!(lifecycle.state(), ServiceState::Failed);
        assert!(lifecycle.settled_at().is_some());
        assert_eq!(
            lifecycle.errors().get("title").unwrap(),
            &["must be filled".to_string()]
        );
        // Raw value stays authoritative for declared fields.
        assert_eq!(lifecycle.arguments().get("title").unwrap(), &json!(""));
    }

    #[test]
    fn should_keep_first_transition_when_settled_twice() {
        let mut lifecycle = Lifecycle::initialize::<Plain>((), Map::new());
        lifecycle.succeed();
        let settled = lifecycle.settled_at();

        lifecycle.fail();
        assert_eq!(lifecycle.state(), ServiceState::Success);
        assert_eq!(lifecycle.settled_at(), settled);
    }

    #[test]
    fn should_flag_hook_dispatch_only_once() {
        let mut lifecycle = Lifecycle::initialize::<Plain>((), Map::new());
        assert!(lifecycle.begin_hook_dispatch());
        assert!(!lifecycle.begin_hook_dispatch());
    }
}
