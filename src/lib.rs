//! strata-schema - configuration schema subsystem for the Strata framework.
//!
//! Collects per-project and per-module configuration schemas (native
//! declarative fragments and Standard Schema validators), merges them into
//! one deterministic tree, validates the resolved runtime configuration
//! against them, and emits a JSON schema document plus generated type
//! declarations for editor support. The main pieces:
//!
//! - Layered schema collection with deep merging (later contribution wins)
//! - A capability contract for third-party validators, library-agnostic
//! - A session-scoped contribution registry with re-entrant registration
//! - Debounced file watching with native and polling backends
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use serde_json::json;
//! use strata_schema::{SchemaOptions, SchemaSession};
//!
//! # async fn example() -> strata_schema::Result<()> {
//! let options = SchemaOptions::new("/my/project", "/my/project/.strata", json!({}));
//! let mut session = SchemaSession::new(options);
//!
//! // Modules register contributions, then the host signals completion.
//! session.modules_done().await?;
//! # Ok(())
//! # }
//! ```

/// Core error types and result aliases.
pub mod error;

/// Narrow hook contract consumed from the module runtime.
pub mod hooks;

/// Session options: layers, build output, environment flags.
pub mod options;

/// Session-scoped schema contribution registry.
pub mod registry;

/// The collect/validate/merge resolution pipeline.
pub mod resolver;

/// Native schema tree: descriptors, normalization, merging.
pub mod schema;

/// Per-build lifecycle integration.
pub mod session;

/// Standard Schema capability contract and validation.
pub mod standard;

/// Debounced schema-file watching for development sessions.
pub mod watch;

/// Schema persistence and type generation.
pub mod writer;

pub use error::{Result, SchemaError};
pub use hooks::{SchemaHooks, SharedHooks};
pub use options::{Layer, SchemaOptions};
pub use registry::{Contribution, SchemaRegistry};
pub use resolver::SchemaResolver;
pub use schema::{SchemaDefinition, SchemaType};
pub use session::SchemaSession;
pub use standard::{
    FnValidator, Issue, StandardSchema, StandardSchemaExtension, ValidationResult, format_issue,
    is_standard_schema,
};
pub use writer::SchemaWriter;
