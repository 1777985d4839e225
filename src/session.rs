//! Lifecycle integration: one schema session per build.
//!
//! The framework's module runtime owns the lifecycle; this type is the
//! subsystem's attachment to it. The host calls [`SchemaSession::modules_done`]
//! once all modules have finished registering, [`SchemaSession::build_done`]
//! at build completion, [`SchemaSession::prepare_types`] when assembling type
//! references, and [`SchemaSession::close`] on shutdown.

use std::{
    path::PathBuf,
    sync::{Arc, RwLock},
};

use crate::{
    error::Result,
    hooks::{SchemaHooks, SharedHooks, write_hooks},
    options::SchemaOptions,
    registry::SchemaRegistry,
    resolver::SchemaResolver,
    schema::SchemaDefinition,
    watch::{self, WatchHandle},
    writer::{SCHEMA_TYPES_FILE, SchemaWriter},
};

/// The session's current resolved schema, swapped wholesale on every pass.
pub(crate) type CurrentSchema = Arc<RwLock<Option<SchemaDefinition>>>;

/// One per-build schema session.
pub struct SchemaSession {
    options: Arc<SchemaOptions>,
    hooks: SharedHooks,
    current: CurrentSchema,
    watch: Option<WatchHandle>,
}

impl SchemaSession {
    /// Creates a session over the given options.
    pub fn new(options: SchemaOptions) -> Self {
        Self {
            options: Arc::new(options),
            hooks: Arc::new(RwLock::new(SchemaHooks::new())),
            current: Arc::new(RwLock::new(None)),
            watch: None,
        }
    }

    /// Session options.
    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Registers a contribution callback run on every resolution pass.
    pub fn on_extend(&self, hook: impl Fn(&mut SchemaRegistry) + Send + Sync + 'static) {
        write_hooks(&self.hooks).on_extend(hook);
    }

    /// Registers a callback fired with each successfully merged schema.
    pub fn on_resolved(&self, hook: impl Fn(&SchemaDefinition) + Send + Sync + 'static) {
        write_hooks(&self.hooks).on_resolved(hook);
    }

    /// Registers a callback fired before each persistence step.
    pub fn on_before_write(&self, hook: impl Fn(&SchemaDefinition) + Send + Sync + 'static) {
        write_hooks(&self.hooks).on_before_write(hook);
    }

    /// Registers a callback fired after each persistence step.
    pub fn on_written(&self, hook: impl Fn() + Send + Sync + 'static) {
        write_hooks(&self.hooks).on_written(hook);
    }

    /// A clone of the current resolved schema, if a pass has completed.
    pub fn current_schema(&self) -> Option<SchemaDefinition> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Runs the first resolution pass once all modules have registered.
    ///
    /// Resolves, persists the result, and in development mode starts the
    /// watch coordinator for debounced re-resolution.
    ///
    /// # Errors
    ///
    /// Propagates resolution and write failures; validation failure aborts
    /// before anything is written.
    pub async fn modules_done(&mut self) -> Result<()> {
        let schema = self.resolver().resolve().await?;
        self.writer().write(&schema).await?;
        self.store(schema);

        if self.options.dev && self.watch.is_none() {
            self.watch = Some(watch::start(
                Arc::clone(&self.options),
                Arc::clone(&self.hooks),
                Arc::clone(&self.current),
            ));
        }

        Ok(())
    }

    /// Re-persists the schema at build completion, picking up any
    /// post-resolution modifications made through the hooks.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub async fn build_done(&self) -> Result<()> {
        if let Some(schema) = self.current_schema() {
            self.writer().write(&schema).await?;
        }
        Ok(())
    }

    /// Contributes the generated declaration file to the host's type
    /// references, writing it first in preparation runs.
    ///
    /// # Errors
    ///
    /// Propagates write failures in preparation runs.
    pub async fn prepare_types(&self, references: &mut Vec<PathBuf>) -> Result<()> {
        references.push(PathBuf::from("schema").join(SCHEMA_TYPES_FILE));

        if self.options.prepare {
            if let Some(schema) = self.current_schema() {
                self.writer().write(&schema).await?;
            }
        }

        Ok(())
    }

    /// Releases watch subscriptions. Safe to call on any session state;
    /// always called on session close, regardless of error paths.
    pub fn close(&mut self) {
        if let Some(mut watch) = self.watch.take() {
            watch.close();
        }
    }

    fn resolver(&self) -> SchemaResolver {
        SchemaResolver::new(Arc::clone(&self.options), Arc::clone(&self.hooks))
    }

    fn writer(&self) -> SchemaWriter {
        SchemaWriter::new(Arc::clone(&self.options), Arc::clone(&self.hooks))
    }

    fn store(&self, schema: SchemaDefinition) {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(schema);
    }
}

impl Drop for SchemaSession {
    fn drop(&mut self) {
        self.close();
    }
}
