//! Standard Schema capability contract and validation.
//!
//! A Standard Schema is any validator, regardless of which library produced
//! it, that exposes a single `validate` capability plus a version marker.
//! The subsystem never introspects a validator beyond that contract: the
//! adapted fragment it contributes to the merged tree is a lossy open object,
//! and real validation always runs the original validator.

mod detect;
mod validate;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

pub use detect::{
    STANDARD_KEY, compile_standard_schema, is_standard_schema, standard_schema_to_definition,
};
pub use validate::{format_issue, validate_with};

/// Boxed error returned by a validator implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One problem reported by a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Key segments from the configuration root to the offending value.
    /// Empty when the issue concerns the root itself.
    pub path: Vec<String>,
    /// Human-readable description of the problem.
    pub message: String,
}

impl Issue {
    /// Creates an issue at the configuration root.
    pub fn root(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }

    /// Creates an issue at the given key path.
    pub fn at(path: impl IntoIterator<Item = impl Into<String>>, message: impl Into<String>) -> Self {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }
}

/// Normalized outcome of one validation call.
///
/// Ephemeral: produced and consumed within a single resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the value was accepted.
    pub success: bool,
    /// Ordered issues when rejected; empty on success.
    pub issues: Vec<Issue>,
}

impl ValidationResult {
    /// An accepting result.
    pub fn success() -> Self {
        Self {
            success: true,
            issues: Vec::new(),
        }
    }

    /// A rejecting result carrying the given issues.
    pub fn failure(issues: Vec<Issue>) -> Self {
        Self {
            success: false,
            issues,
        }
    }
}

/// The Standard Schema capability: validate a value, report issues.
///
/// An empty issue list means the value was accepted. Implementations return
/// `Err` only for faults in the validator itself (the caller converts those
/// into a synthetic issue, never a propagated error).
#[async_trait]
pub trait StandardSchema: Send + Sync {
    /// Runs the validator against a configuration value.
    ///
    /// # Errors
    ///
    /// Returns an error if the validator itself fails to run; a rejected
    /// value is reported through the issue list instead.
    async fn validate(&self, value: &Value) -> Result<Vec<Issue>, BoxError>;

    /// Capability contract version the validator implements.
    fn version(&self) -> u64 {
        1
    }

    /// Library that produced the validator, for diagnostics.
    fn vendor(&self) -> &str {
        "custom"
    }
}

/// A registry entry pairing a configuration path with a validator.
///
/// The path (dot-separated keys into the resolved configuration) identifies
/// which sub-tree the validator must accept.
#[derive(Clone)]
pub struct StandardSchemaExtension {
    /// Dot-separated key into the final configuration (e.g. `"myFeature"`).
    pub config_path: String,
    /// The validator for that sub-tree.
    pub schema: Arc<dyn StandardSchema>,
}

impl std::fmt::Debug for StandardSchemaExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardSchemaExtension")
            .field("config_path", &self.config_path)
            .field("vendor", &self.schema.vendor())
            .finish()
    }
}

/// A [`StandardSchema`] backed by a plain function.
///
/// The simplest way for a module to bring its own validation logic without
/// depending on a schema library.
pub struct FnValidator<F> {
    vendor: String,
    check: F,
}

impl<F> FnValidator<F>
where
    F: Fn(&Value) -> Vec<Issue> + Send + Sync,
{
    /// Wraps a validation function under the given vendor name.
    pub fn new(vendor: impl Into<String>, check: F) -> Self {
        Self {
            vendor: vendor.into(),
            check,
        }
    }
}

#[async_trait]
impl<F> StandardSchema for FnValidator<F>
where
    F: Fn(&Value) -> Vec<Issue> + Send + Sync,
{
    async fn validate(&self, value: &Value) -> Result<Vec<Issue>, BoxError> {
        Ok((self.check)(value))
    }

    fn vendor(&self) -> &str {
        &self.vendor
    }
}
