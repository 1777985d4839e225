//! Session-scoped list of schema contributions.
//!
//! A fresh [`SchemaRegistry`] is built for every resolution pass and passed
//! to each extension callback; nothing here is global state. Contributions
//! are appended in registration order, which fixes the merge order.

use std::{collections::BTreeMap, sync::Arc};

use serde_json::Value;

use crate::{
    error::{Result, SchemaError},
    schema::SchemaDefinition,
    standard::{StandardSchema, StandardSchemaExtension},
};

/// One schema contribution prior to merging.
pub enum Contribution {
    /// A normalized native schema fragment.
    Fragment(SchemaDefinition),
    /// A loosely authored fragment, normalized at merge time.
    Raw(Value),
    /// A path-scoped third-party validator.
    Extension(StandardSchemaExtension),
}

impl std::fmt::Debug for Contribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Contribution::Fragment(_) => f.write_str("Fragment"),
            Contribution::Raw(_) => f.write_str("Raw"),
            Contribution::Extension(ext) => write!(f, "Extension({})", ext.config_path),
        }
    }
}

type DeferredRegistration = Box<dyn FnOnce(&mut SchemaRegistry) + Send>;

/// Bound on re-entrant registration rounds before the pass is declared stuck.
const MAX_DRAIN_PASSES: usize = 32;

/// Append-only contribution list for one resolution pass.
///
/// Contributions may themselves register further contributions (a module's
/// extension can pull in another module's schema); those are deferred and
/// drained to a fixpoint before the pass completes, with a bounded round
/// count to catch runaway re-entrancy.
#[derive(Default)]
pub struct SchemaRegistry {
    entries: Vec<Contribution>,
    deferred: Vec<DeferredRegistration>,
}

impl SchemaRegistry {
    /// Creates an empty registry for a new resolution pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a contribution.
    pub fn register(&mut self, contribution: Contribution) {
        self.entries.push(contribution);
    }

    /// Appends a normalized native fragment.
    pub fn register_fragment(&mut self, fragment: SchemaDefinition) {
        self.entries.push(Contribution::Fragment(fragment));
    }

    /// Appends a loosely authored fragment.
    pub fn register_raw(&mut self, raw: Value) {
        self.entries.push(Contribution::Raw(raw));
    }

    /// Appends a path-scoped validator.
    ///
    /// Multiple registrations for the same path accumulate; every validator
    /// registered for a path runs independently during resolution.
    pub fn register_extension(
        &mut self,
        config_path: impl Into<String>,
        schema: Arc<dyn StandardSchema>,
    ) {
        self.entries.push(Contribution::Extension(StandardSchemaExtension {
            config_path: config_path.into(),
            schema,
        }));
    }

    /// Defers a registration until the current dispatch round finishes.
    ///
    /// Safe to call from within a contribution that is itself being
    /// processed; the deferred closure runs before the pass completes.
    pub fn defer(&mut self, register: impl FnOnce(&mut SchemaRegistry) + Send + 'static) {
        self.deferred.push(Box::new(register));
    }

    /// Runs deferred registrations to a fixpoint.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ExtendOverflow` if deferred registrations keep
    /// producing more deferred registrations past the bounded round count.
    pub fn drain(&mut self) -> Result<()> {
        let mut passes = 0;

        while !self.deferred.is_empty() {
            passes += 1;
            if passes > MAX_DRAIN_PASSES {
                return Err(SchemaError::ExtendOverflow { passes });
            }

            for registration in std::mem::take(&mut self.deferred) {
                registration(self);
            }
        }

        Ok(())
    }

    /// Number of registered contributions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no contributions have been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the registry, splitting contributions into ordered fragments
    /// and per-path validator sets.
    ///
    /// Validators registered for the same path accumulate in registration
    /// order rather than replacing one another.
    pub fn into_parts(self) -> (Vec<Contribution>, PathValidators) {
        let mut fragments = Vec::new();
        let mut validators: PathValidators = BTreeMap::new();

        for entry in self.entries {
            match entry {
                Contribution::Extension(ext) => {
                    validators
                        .entry(ext.config_path)
                        .or_default()
                        .push(ext.schema);
                }
                fragment => fragments.push(fragment),
            }
        }

        (fragments, validators)
    }
}

/// Validators grouped by configuration path, in deterministic path order.
pub type PathValidators = BTreeMap<String, Vec<Arc<dyn StandardSchema>>>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::standard::FnValidator;
    use serde_json::json;

    fn noop_validator() -> Arc<dyn StandardSchema> {
        Arc::new(FnValidator::new("test", |_| Vec::new()))
    }

    #[test]
    fn contributions_keep_registration_order() {
        let mut registry = SchemaRegistry::new();
        registry.register_raw(json!({ "a": 1 }));
        registry.register_raw(json!({ "b": 2 }));

        let (fragments, _) = registry.into_parts();
        assert_eq!(fragments.len(), 2);
        assert!(matches!(&fragments[0], Contribution::Raw(v) if v.get("a").is_some()));
    }

    #[test]
    fn same_path_extensions_accumulate() {
        let mut registry = SchemaRegistry::new();
        registry.register_extension("myFeature", noop_validator());
        registry.register_extension("myFeature", noop_validator());
        registry.register_extension("other", noop_validator());

        let (_, validators) = registry.into_parts();

        assert_eq!(validators["myFeature"].len(), 2);
        assert_eq!(validators["other"].len(), 1);
    }

    #[test]
    fn deferred_registrations_drain_to_fixpoint() {
        let mut registry = SchemaRegistry::new();
        registry.defer(|reg| {
            reg.register_raw(json!({ "first": 1 }));
            reg.defer(|reg| {
                reg.register_raw(json!({ "second": 2 }));
            });
        });

        registry.drain().unwrap();

        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn runaway_reentrancy_is_bounded() {
        fn endless(reg: &mut SchemaRegistry) {
            reg.defer(endless);
        }

        let mut registry = SchemaRegistry::new();
        registry.defer(endless);

        let result = registry.drain();
        assert!(matches!(result, Err(SchemaError::ExtendOverflow { .. })));
    }
}
