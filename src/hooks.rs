//! The narrow hook contract the schema core consumes.
//!
//! The framework's module runtime dispatches many lifecycle events; the
//! schema subsystem only needs four of them, modeled here as typed callback
//! lists. Extend callbacks receive the pass's [`SchemaRegistry`] by mutable
//! reference and append contributions to it; the remaining hooks observe the
//! pipeline (resolved schema, persistence bracketing).

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{error::Result, registry::SchemaRegistry, schema::SchemaDefinition};

/// Hook set shared between the session, resolver, writer, and watch task.
pub type SharedHooks = Arc<RwLock<SchemaHooks>>;

/// Acquires a read guard, recovering from a poisoned lock. Hook callbacks
/// run behind this lock and a panicked callback must not wedge later
/// resolution passes.
pub(crate) fn read_hooks(hooks: &SharedHooks) -> RwLockReadGuard<'_, SchemaHooks> {
    match hooks.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Acquires a write guard, recovering from a poisoned lock.
pub(crate) fn write_hooks(hooks: &SharedHooks) -> RwLockWriteGuard<'_, SchemaHooks> {
    match hooks.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

type ExtendHook = Box<dyn Fn(&mut SchemaRegistry) + Send + Sync>;
type SchemaHook = Box<dyn Fn(&SchemaDefinition) + Send + Sync>;
type NotifyHook = Box<dyn Fn() + Send + Sync>;

/// Typed callback lists for the schema lifecycle hooks.
#[derive(Default)]
pub struct SchemaHooks {
    extend: Vec<ExtendHook>,
    resolved: Vec<SchemaHook>,
    before_write: Vec<SchemaHook>,
    written: Vec<NotifyHook>,
}

impl SchemaHooks {
    /// Creates an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback invoked during contribution collection.
    ///
    /// The callback runs on every resolution pass and may register fragments
    /// and path-scoped validators on the registry it receives.
    pub fn on_extend(&mut self, hook: impl Fn(&mut SchemaRegistry) + Send + Sync + 'static) {
        self.extend.push(Box::new(hook));
    }

    /// Registers a callback fired once per successful resolution with the
    /// immutable merged schema.
    pub fn on_resolved(&mut self, hook: impl Fn(&SchemaDefinition) + Send + Sync + 'static) {
        self.resolved.push(Box::new(hook));
    }

    /// Registers a callback fired before the schema is persisted.
    pub fn on_before_write(&mut self, hook: impl Fn(&SchemaDefinition) + Send + Sync + 'static) {
        self.before_write.push(Box::new(hook));
    }

    /// Registers a callback fired after the schema has been persisted.
    pub fn on_written(&mut self, hook: impl Fn() + Send + Sync + 'static) {
        self.written.push(Box::new(hook));
    }

    /// Dispatches extend callbacks and drains re-entrant registrations.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ExtendOverflow` if deferred registrations fail
    /// to settle.
    pub(crate) fn call_extend(&self, registry: &mut SchemaRegistry) -> Result<()> {
        for hook in &self.extend {
            hook(registry);
        }
        registry.drain()
    }

    pub(crate) fn call_resolved(&self, schema: &SchemaDefinition) {
        for hook in &self.resolved {
            hook(schema);
        }
    }

    pub(crate) fn call_before_write(&self, schema: &SchemaDefinition) {
        for hook in &self.before_write {
            hook(schema);
        }
    }

    pub(crate) fn call_written(&self) {
        for hook in &self.written {
            hook();
        }
    }
}
