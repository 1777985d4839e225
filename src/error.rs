//! Core error types and result alias for the schema subsystem.

use std::{
    fmt, io,
    path::{Path, PathBuf},
    result,
};

use thiserror::Error;

/// Error types for schema collection, validation, and persistence.
///
/// Recoverable conditions (a layer schema that fails to load, a watcher
/// backend that fails to initialize) are logged at their call sites and do
/// not surface through this type; everything here aborts the operation that
/// produced it.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The resolved runtime configuration was rejected by one or more
    /// Standard Schema validators. Individual issues are logged before this
    /// aggregate error is returned.
    #[error("configuration validation failed for '{scope}' ({issue_count} issue(s))")]
    ValidationFailed {
        /// Which slice of the configuration failed (`root` or a dot path).
        scope: String,
        /// Number of issues reported by the validator.
        issue_count: usize,
    },

    /// A schema file or in-memory value does not have a loadable shape.
    #[error("invalid schema at '{location}': {details}")]
    InvalidSchema {
        /// Where the schema came from (file path or "inline").
        location: String,
        /// Why the value was rejected.
        details: String,
    },

    /// A Standard Schema capability object could not be compiled into a
    /// runnable validator.
    #[error("failed to compile Standard Schema: {details}")]
    Compile {
        /// Compilation error details.
        details: String,
    },

    /// Schema extension hooks kept registering further contributions without
    /// settling.
    #[error("schema extension hooks did not settle after {passes} passes")]
    ExtendOverflow {
        /// Number of drain passes attempted.
        passes: usize,
    },

    /// Failed to parse TOML content.
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParse {
        /// Location of the TOML being parsed (file path or "string").
        location: String,
        /// Parse error details.
        details: String,
    },

    /// Failed to parse JSON content.
    #[error("failed to parse JSON at '{location}': {details}")]
    JsonParse {
        /// Location of the JSON being parsed (file path or "string").
        location: String,
        /// Parse error details.
        details: String,
    },

    /// Failed to serialize a schema document.
    #[error("failed to serialize {content_type}: {details}")]
    Serialization {
        /// What was being serialized (e.g. "merged schema").
        content_type: String,
        /// Serialization error details.
        details: String,
    },

    /// I/O operation error with path context.
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// I/O error details.
        details: String,
    },

    /// Standard I/O operation error (for compatibility).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A specialized `Result` type for schema operations.
pub type Result<T> = result::Result<T, SchemaError>;

impl SchemaError {
    /// Creates a TOML parsing error with optional file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying parsing error
    /// * `path` - Optional path to the file that failed to parse
    pub fn toml_parse(error: impl fmt::Display, path: Option<&Path>) -> Self {
        SchemaError::TomlParse {
            location: location_for(path),
            details: error.to_string(),
        }
    }

    /// Creates a JSON parsing error with optional file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying parsing error
    /// * `path` - Optional path to the file that failed to parse
    pub fn json_parse(error: impl fmt::Display, path: Option<&Path>) -> Self {
        SchemaError::JsonParse {
            location: location_for(path),
            details: error.to_string(),
        }
    }

    /// Creates an I/O error with file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying I/O error
    /// * `path` - Path where the operation failed
    pub fn io(error: impl fmt::Display, path: &Path) -> Self {
        SchemaError::IoError {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }

    /// Creates an invalid-schema error for a loaded value.
    ///
    /// # Arguments
    ///
    /// * `path` - Optional path to the file the value came from
    /// * `details` - Why the value was rejected
    pub fn invalid_schema(path: Option<&Path>, details: impl Into<String>) -> Self {
        SchemaError::InvalidSchema {
            location: location_for(path),
            details: details.into(),
        }
    }
}

fn location_for(path: Option<&Path>) -> String {
    match path {
        Some(p) => {
            let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
            clean_path.to_string_lossy().to_string()
        }
        None => "inline".to_string(),
    }
}
