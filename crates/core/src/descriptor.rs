//! Type descriptors — per-type schema binding and callback registry.
//!
//! A descriptor is built exactly once per service type, typically behind a
//! `LazyLock`, and is shared read-only by every instance of that type.
//! Instances never mutate it.

use std::fmt;
use std::sync::Arc;

use crate::errors::ServiceError;
use crate::ports::validator::SchemaHandle;
use crate::service::Service;

/// Event a callback is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    /// Runs after the instance settles into success.
    Success,
    /// Runs after the instance settles into failed.
    Fail,
}

/// One registered callback for a service type.
pub struct Hook<S> {
    name: Option<&'static str>,
    run: Arc<dyn Fn(&mut S) -> Result<(), ServiceError> + Send + Sync>,
}

impl<S> Hook<S> {
    /// Label of a named handler; `None` for closures.
    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    /// Label used in tracing events and callback faults.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.name.unwrap_or("anonymous")
    }

    pub(crate) fn invoke(&self, service: &mut S) -> Result<(), ServiceError> {
        (self.run)(service)
    }
}

impl<S> Clone for Hook<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            run: Arc::clone(&self.run),
        }
    }
}

impl<S> fmt::Debug for Hook<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Ordered success/fail callback lists for one service type.
///
/// Ancestor-first ordering is structural: a subtype's hook set starts as a
/// copy of its parent's entries via [`inheriting`](Self::inheriting) and
/// appends its own, so dispatch order never depends on walking an ancestry
/// chain at runtime.
pub struct Hooks<S> {
    success: Vec<Hook<S>>,
    fail: Vec<Hook<S>>,
}

impl<S: 'static> Default for Hooks<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for Hooks<S> {
    fn clone(&self) -> Self {
        Self {
            success: self.success.clone(),
            fail: self.fail.clone(),
        }
    }
}

impl<S> fmt::Debug for Hooks<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("success", &self.success)
            .field("fail", &self.fail)
            .finish()
    }
}

impl<S: 'static> Hooks<S> {
    /// Create an empty hook set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            success: Vec::new(),
            fail: Vec::new(),
        }
    }

    /// Start from a copy of `parent`'s entries.
    ///
    /// Entries appended afterwards run after every inherited entry of the
    /// same event.
    #[must_use]
    pub fn inheriting(parent: &Self) -> Self {
        parent.clone()
    }

    /// Append a closure success handler.
    #[must_use]
    pub fn on_success<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut S) -> Result<(), ServiceError> + Send + Sync + 'static,
    {
        self.success.push(Hook {
            name: None,
            run: Arc::new(handler),
        });
        self
    }

    /// Append a named success handler.
    #[must_use]
    pub fn on_success_named(
        mut self,
        name: &'static str,
        handler: fn(&mut S) -> Result<(), ServiceError>,
    ) -> Self {
        self.success.push(Hook {
            name: Some(name),
            run: Arc::new(handler),
        });
        self
    }

    /// Append a closure fail handler.
    #[must_use]
    pub fn on_fail<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut S) -> Result<(), ServiceError> + Send + Sync + 'static,
    {
        self.fail.push(Hook {
            name: None,
            run: Arc::new(handler),
        });
        self
    }

    /// Append a named fail handler.
    #[must_use]
    pub fn on_fail_named(
        mut self,
        name: &'static str,
        handler: fn(&mut S) -> Result<(), ServiceError>,
    ) -> Self {
        self.fail.push(Hook {
            name: Some(name),
            run: Arc::new(handler),
        });
        self
    }

    /// Whether no handler is registered for either event.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.fail.is_empty()
    }

    pub(crate) fn for_event(&self, event: HookEvent) -> &[Hook<S>] {
        match event {
            HookEvent::Success => &self.success,
            HookEvent::Fail => &self.fail,
        }
    }
}

/// Immutable per-type registry: the optional schema and the callbacks.
pub struct Descriptor<S: Service> {
    schema: Option<Arc<dyn SchemaHandle<S::Context>>>,
    hooks: Hooks<S>,
}

impl<S: Service + 'static> Descriptor<S> {
    /// Start building a descriptor.
    #[must_use]
    pub fn builder() -> DescriptorBuilder<S> {
        DescriptorBuilder {
            schema: None,
            hooks: Hooks::new(),
        }
    }

    /// The declared schema, if any.
    #[must_use]
    pub fn schema(&self) -> Option<&Arc<dyn SchemaHandle<S::Context>>> {
        self.schema.as_ref()
    }

    /// The type's callback registry.
    #[must_use]
    pub fn hooks(&self) -> &Hooks<S> {
        &self.hooks
    }
}

impl<S: Service> fmt::Debug for Descriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("schema", &self.schema.as_ref().map(|s| s.declared_fields()))
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Builder for a [`Descriptor`].
pub struct DescriptorBuilder<S: Service> {
    schema: Option<Arc<dyn SchemaHandle<S::Context>>>,
    hooks: Hooks<S>,
}

impl<S: Service + 'static> DescriptorBuilder<S> {
    /// Declare the type's schema.
    ///
    /// A type holds at most one schema: declaring again replaces the
    /// previous declaration entirely, there is no merge.
    #[must_use]
    pub fn schema(mut self, handle: impl SchemaHandle<S::Context> + 'static) -> Self {
        self.schema = Some(Arc::new(handle));
        self
    }

    /// Reuse an already compiled schema, shared with other service types.
    #[must_use]
    pub fn schema_shared(mut self, handle: Arc<dyn SchemaHandle<S::Context>>) -> Self {
        self.schema = Some(handle);
        self
    }

    /// Install `hooks` as the type's hook set, replacing the current one.
    ///
    /// Call this before appending the type's own handlers when inheriting
    /// a parent's entries.
    #[must_use]
    pub fn hooks(mut self, hooks: Hooks<S>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Append a closure success handler.
    #[must_use]
    pub fn on_success<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut S) -> Result<(), ServiceError> + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_success(handler);
        self
    }

    /// Append a named success handler.
    #[must_use]
    pub fn on_success_named(
        mut self,
        name: &'static str,
        handler: fn(&mut S) -> Result<(), ServiceError>,
    ) -> Self {
        self.hooks = self.hooks.on_success_named(name, handler);
        self
    }

    /// Append a closure fail handler.
    #[must_use]
    pub fn on_fail<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut S) -> Result<(), ServiceError> + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_fail(handler);
        self
    }

    /// Append a named fail handler.
    #[must_use]
    pub fn on_fail_named(
        mut self,
        name: &'static str,
        handler: fn(&mut S) -> Result<(), ServiceError>,
    ) -> Self {
        self.hooks = self.hooks.on_fail_named(name, handler);
        self
    }

    /// Finish the descriptor.
    #[must_use]
    pub fn build(self) -> Descriptor<S> {
        Descriptor {
            schema: self.schema,
            hooks: self.hooks,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use serde_json::{Map, Value};

    use super::*;
    use crate::errors::ServiceError;
    use crate::lifecycle::Lifecycle;
    use crate::ports::validator::ValidationReport;

    struct FixedFields(Vec<String>);

    impl SchemaHandle<()> for FixedFields {
        fn declared_fields(&self) -> &[String] {
            &self.0
        }

        fn run(&self, _raw: &Map<String, Value>, _context: &()) -> ValidationReport {
            ValidationReport::default()
        }
    }

    struct Stub {
        lifecycle: Lifecycle<()>,
    }

    static STUB_DESCRIPTOR: LazyLock<Descriptor<Stub>> =
        LazyLock::new(|| Descriptor::builder().build());

    impl Service for Stub {
        type Context = ();

        fn descriptor() -> &'static Descriptor<Self> {
            &STUB_DESCRIPTOR
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

    fn noop(_: &mut Stub) -> Result<(), ServiceError> {
        Ok(())
    }

    #[test]
    fn should_keep_last_schema_when_declared_twice() {
        let descriptor: Descriptor<Stub> = Descriptor::builder()
            .schema(FixedFields(vec!["first".to_string()]))
            .schema(FixedFields(vec!["second".to_string()]))
            .build();

        let declared = descriptor.schema().unwrap().declared_fields();
        assert_eq!(declared, ["second".to_string()]);
    }

    #[test]
    fn should_have_no_schema_by_default() {
        let descriptor: Descriptor<Stub> = Descriptor::builder().build();
        assert!(descriptor.schema().is_none());
        assert!(descriptor.hooks().is_empty());
    }

    #[test]
    fn should_share_one_compiled_schema_between_declarations() {
        let shared: Arc<dyn SchemaHandle<()>> =
            Arc::new(FixedFields(vec!["email".to_string()]));

        let a: Descriptor<Stub> = Descriptor::builder().schema_shared(Arc::clone(&shared)).build();
        let b: Descriptor<Stub> = Descriptor::builder().schema_shared(shared).build();

        assert_eq!(a.schema().unwrap().declared_fields(), b.schema().unwrap().declared_fields());
    }

    #[test]
    fn should_order_inherited_hooks_before_own_entries() {
        let parent = Hooks::new()
            .on_success_named("parent_success", noop)
            .on_fail_named("parent_fail", noop);
        let child = Hooks::inheriting(&parent)
            .on_success_named("child_success", noop)
            .on_success(|_stub| Ok(()));

        let names: Vec<Option<&str>> = child
            .for_event(HookEvent::Success)
            .iter()
            .map(Hook::name)
            .collect();
        assert_eq!(names, [Some("parent_success"), Some("child_success"), None]);
        assert_eq!(child.for_event(HookEvent::Fail).len(), 1);
    }

    #[test]
    fn should_label_closure_hooks_as_anonymous() {
        let hooks: Hooks<Stub> = Hooks::new().on_fail(|_stub| Ok(()));
        assert_eq!(hooks.for_event(HookEvent::Fail)[0].label(), "anonymous");
    }
}
