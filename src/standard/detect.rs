use std::sync::{Arc, Once};

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::{BoxError, Issue, StandardSchema};
use crate::{
    error::{Result, SchemaError},
    schema::SchemaDefinition,
};

/// Reserved key under which a value exposes the Standard Schema capability.
pub const STANDARD_KEY: &str = "~standard";

static CONVERSION_ADVISORY: Once = Once::new();

/// Structural capability check for the Standard Schema contract.
///
/// True iff the value is an object whose `~standard` key holds an object
/// with a `validate` member and a numeric `version`. Never panics; `null`,
/// primitives, and plain objects without the reserved key return false.
pub fn is_standard_schema(value: &Value) -> bool {
    value
        .get(STANDARD_KEY)
        .and_then(Value::as_object)
        .is_some_and(|caps| {
            caps.contains_key("validate") && caps.get("version").is_some_and(Value::is_number)
        })
}

/// Compiles a capability-shaped value into a runnable validator.
///
/// Data files cannot carry callables, so the `~standard.validate` member is
/// a JSON Schema document; it is compiled here into the callable capability.
///
/// # Errors
///
/// Returns `SchemaError::InvalidSchema` if the value does not satisfy the
/// capability contract, or `SchemaError::Compile` if the embedded document
/// is not a valid JSON Schema.
pub fn compile_standard_schema(value: &Value) -> Result<Arc<dyn StandardSchema>> {
    if !is_standard_schema(value) {
        return Err(SchemaError::invalid_schema(
            None,
            "value does not expose the Standard Schema capability",
        ));
    }

    let caps = value
        .get(STANDARD_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| {
            SchemaError::invalid_schema(None, "missing Standard Schema capability object")
        })?;

    let document = caps.get("validate").cloned().unwrap_or(Value::Null);
    let validator = jsonschema::validator_for(&document).map_err(|e| SchemaError::Compile {
        details: e.to_string(),
    })?;

    Ok(Arc::new(CompiledStandardSchema {
        validator,
        version: caps.get("version").and_then(Value::as_u64).unwrap_or(1),
        vendor: caps
            .get("vendor")
            .and_then(Value::as_str)
            .unwrap_or("json-schema")
            .to_string(),
    }))
}

/// Best-effort lossy conversion of a validator into a mergeable fragment.
///
/// The capability contract gives no way to introspect the validator's shape,
/// so the fragment is a minimally permissive open object: it must never
/// reject configuration the original validator would accept, since it is
/// merged with (not substituted for) direct validation.
pub fn standard_schema_to_definition(schema: &dyn StandardSchema) -> SchemaDefinition {
    CONVERSION_ADVISORY.call_once(|| {
        warn!("Standard Schema conversion is approximate; converted fragments describe an open object");
    });

    SchemaDefinition::open_object(format!(
        "Converted from a Standard Schema validator ({})",
        schema.vendor()
    ))
}

/// A [`StandardSchema`] backed by a compiled JSON Schema document.
struct CompiledStandardSchema {
    validator: jsonschema::Validator,
    version: u64,
    vendor: String,
}

#[async_trait]
impl StandardSchema for CompiledStandardSchema {
    async fn validate(&self, value: &Value) -> std::result::Result<Vec<Issue>, BoxError> {
        let issues = self
            .validator
            .iter_errors(value)
            .map(|error| Issue {
                path: error
                    .instance_path
                    .to_string()
                    .split('/')
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_owned)
                    .collect(),
                message: error.to_string(),
            })
            .collect();

        Ok(issues)
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn vendor(&self) -> &str {
        &self.vendor
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_null_and_primitives() {
        assert!(!is_standard_schema(&Value::Null));
        assert!(!is_standard_schema(&json!(42)));
        assert!(!is_standard_schema(&json!("~standard")));
        assert!(!is_standard_schema(&json!([1, 2, 3])));
    }

    #[test]
    fn rejects_plain_objects_without_capability_key() {
        assert!(!is_standard_schema(&json!({ "validate": {}, "version": 1 })));
        assert!(!is_standard_schema(&json!({ "timeout": 1000 })));
    }

    #[test]
    fn rejects_capability_with_non_numeric_version() {
        let value = json!({ "~standard": { "validate": {}, "version": "1" } });
        assert!(!is_standard_schema(&value));
    }

    #[test]
    fn accepts_ad_hoc_capability_object() {
        let value = json!({
            "~standard": {
                "version": 1,
                "validate": { "type": "object" }
            }
        });
        assert!(is_standard_schema(&value));
    }

    #[tokio::test]
    async fn compiled_schema_reports_typed_issues() {
        let value = json!({
            "~standard": {
                "version": 1,
                "vendor": "test",
                "validate": {
                    "type": "object",
                    "properties": { "timeout": { "type": "integer", "minimum": 1000 } }
                }
            }
        });

        let schema = compile_standard_schema(&value).unwrap();
        let issues = schema
            .validate(&json!({ "timeout": 50 }))
            .await
            .unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, vec!["timeout".to_string()]);
    }

    #[tokio::test]
    async fn compiled_schema_accepts_valid_value() {
        let value = json!({
            "~standard": {
                "version": 1,
                "validate": { "type": "object" }
            }
        });

        let schema = compile_standard_schema(&value).unwrap();
        assert!(schema.validate(&json!({})).await.unwrap().is_empty());
    }

    #[test]
    fn compile_rejects_non_capability_value() {
        let result = compile_standard_schema(&json!({ "timeout": 1000 }));
        assert!(matches!(result, Err(SchemaError::InvalidSchema { .. })));
    }

    #[test]
    fn conversion_produces_open_object() {
        let value = json!({
            "~standard": { "version": 1, "validate": {} }
        });
        let schema = compile_standard_schema(&value).unwrap();

        let def = standard_schema_to_definition(&*schema);

        assert_eq!(def.additional_properties, Some(true));
        assert!(def.is_unconstrained());
    }
}
