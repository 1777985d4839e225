//! The resolution pipeline: collect, validate, merge.
//!
//! A resolution pass seeds fragments from the project's own schema slot,
//! loads each layer's schema file, collects module contributions through the
//! extend hooks, validates the runtime configuration against every Standard
//! Schema, and deep-merges the surviving fragments into one tree. Validation
//! runs before the merge: an invalid configuration value must never reach
//! the generated types.

mod loader;

use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, error, info, warn};

pub use loader::{SCHEMA_FILE_NAMES, load_layer_schema};

use crate::{
    error::{Result, SchemaError},
    hooks::{SharedHooks, read_hooks},
    options::SchemaOptions,
    registry::{Contribution, PathValidators, SchemaRegistry},
    schema::{SchemaDefinition, merge_all},
    standard::{
        StandardSchema, ValidationResult, compile_standard_schema, format_issue,
        is_standard_schema, standard_schema_to_definition, validate_with,
    },
};

/// Walks a dot-separated path into a configuration value.
///
/// Returns `None` when any segment is absent; a present-but-null value is
/// still returned (absent means "nothing configured yet", null is a value).
pub fn config_slice<'a>(config: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(config, |value, key| value.get(key))
}

/// Resolves the merged schema for one session.
#[derive(Clone)]
pub struct SchemaResolver {
    options: Arc<SchemaOptions>,
    hooks: SharedHooks,
}

impl SchemaResolver {
    /// Creates a resolver over the given session options and hook set.
    pub fn new(options: Arc<SchemaOptions>, hooks: SharedHooks) -> Self {
        Self { options, hooks }
    }

    /// Runs one full resolution pass and returns the merged schema.
    ///
    /// Layer files that fail to load are logged and skipped; everything else
    /// in the pipeline is fatal for the pass.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidationFailed` if any Standard Schema rejects
    /// the runtime configuration, `SchemaError::ExtendOverflow` if extension
    /// hooks fail to settle, or a compile error if the project's own schema
    /// slot carries an invalid capability object.
    pub async fn resolve(&self) -> Result<SchemaDefinition> {
        let mut fragments: Vec<Contribution> = Vec::new();
        let mut root_validators: Vec<Arc<dyn StandardSchema>> = Vec::new();

        // The project's own schema slot is in-memory; a broken capability
        // object there is a programming error, not a load failure.
        if let Some(root) = &self.options.root_schema {
            classify(root, &mut fragments, &mut root_validators)?;
        }

        // Layer files load concurrently; merge order stays layer order.
        let loads = join_all(self.options.layers.iter().map(load_layer_schema)).await;
        for (layer, loaded) in self.options.layers.iter().zip(loads) {
            let classified = loaded.and_then(|value| match value {
                Some(value) => classify(&value, &mut fragments, &mut root_validators),
                None => Ok(()),
            });

            if let Err(err) = classified {
                warn!(layer = %layer.name, error = %err, "unable to load layer schema, skipping");
            }
        }

        let mut registry = SchemaRegistry::new();
        read_hooks(&self.hooks).call_extend(&mut registry)?;
        let (hook_fragments, path_validators) = registry.into_parts();
        fragments.extend(hook_fragments);

        self.validate(&root_validators, &path_validators).await?;

        let schema = merge_all(fragments.into_iter().filter_map(|entry| match entry {
            Contribution::Fragment(def) => Some(def),
            Contribution::Raw(raw) => Some(SchemaDefinition::resolve(&raw)),
            Contribution::Extension(_) => None,
        }));

        read_hooks(&self.hooks).call_resolved(&schema);

        Ok(schema)
    }

    async fn validate(
        &self,
        root_validators: &[Arc<dyn StandardSchema>],
        path_validators: &PathValidators,
    ) -> Result<()> {
        let total = root_validators.len() + path_validators.values().map(Vec::len).sum::<usize>();
        if total == 0 {
            return Ok(());
        }

        for schema in root_validators {
            let result = validate_with(&**schema, &self.options.runtime_config).await;
            if !result.success {
                return Err(report_failure("root", &result));
            }
        }

        for (config_path, validators) in path_validators {
            let Some(slice) = config_slice(&self.options.runtime_config, config_path) else {
                debug!(path = %config_path, "nothing configured at path, skipping validation");
                continue;
            };

            // Every validator registered for a path runs; the first rejection
            // reports that path.
            for schema in validators {
                let result = validate_with(&**schema, slice).await;
                if !result.success {
                    return Err(report_failure(config_path, &result));
                }
            }
        }

        info!("Standard Schema validation passed ({total} validator(s))");
        Ok(())
    }
}

/// Classifies a loaded schema value: capability objects are compiled into a
/// root validator plus a lossy adapted fragment, anything else is a raw
/// fragment merged as-is.
fn classify(
    value: &Value,
    fragments: &mut Vec<Contribution>,
    root_validators: &mut Vec<Arc<dyn StandardSchema>>,
) -> Result<()> {
    if is_standard_schema(value) {
        let compiled = compile_standard_schema(value)?;
        fragments.push(Contribution::Fragment(standard_schema_to_definition(
            &*compiled,
        )));
        root_validators.push(compiled);
    } else {
        fragments.push(Contribution::Raw(value.clone()));
    }

    Ok(())
}

fn report_failure(scope: &str, result: &ValidationResult) -> SchemaError {
    error!("Standard Schema validation failed for '{scope}':");
    for (index, issue) in result.issues.iter().enumerate() {
        error!("  {}. {}", index + 1, format_issue(issue));
    }

    SchemaError::ValidationFailed {
        scope: scope.to_string(),
        issue_count: result.issues.len(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn slice_walks_nested_paths() {
        let config = json!({ "server": { "port": 3000 } });

        assert_eq!(config_slice(&config, "server.port"), Some(&json!(3000)));
        assert_eq!(config_slice(&config, "server"), Some(&json!({ "port": 3000 })));
    }

    #[test]
    fn slice_is_none_for_absent_paths() {
        let config = json!({ "server": {} });

        assert!(config_slice(&config, "server.port").is_none());
        assert!(config_slice(&config, "missing.deeply.nested").is_none());
    }

    #[test]
    fn slice_returns_explicit_null() {
        let config = json!({ "feature": null });
        assert_eq!(config_slice(&config, "feature"), Some(&Value::Null));
    }

    #[test]
    fn classify_splits_capability_from_raw() {
        let mut fragments = Vec::new();
        let mut validators = Vec::new();

        classify(
            &json!({ "~standard": { "version": 1, "validate": {} } }),
            &mut fragments,
            &mut validators,
        )
        .unwrap();
        classify(&json!({ "timeout": 1000 }), &mut fragments, &mut validators).unwrap();

        assert_eq!(fragments.len(), 2);
        assert_eq!(validators.len(), 1);
        assert!(matches!(&fragments[0], Contribution::Fragment(def) if def.is_unconstrained()));
        assert!(matches!(&fragments[1], Contribution::Raw(_)));
    }
}
