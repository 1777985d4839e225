//! Debounced re-resolution of schema files in development sessions.
//!
//! The coordinator watches every configuration layer's root directory for
//! `strata.schema.*` changes and coalesces event bursts into single
//! resolve+write cycles. Cycles run sequentially on one driver task, so two
//! resolution passes never interleave; a change arriving mid-cycle simply
//! schedules the next one.

mod backend;
mod debounce;

use std::{sync::Arc, time::Instant};

use regex::Regex;
use tokio::{sync::{mpsc, oneshot}, task::JoinHandle};
use tracing::{debug, error, info, warn};

pub use backend::{WATCHER_ENV, WatchBackend};
pub use debounce::Debouncer;

use crate::{
    hooks::SharedHooks,
    options::SchemaOptions,
    resolver::SchemaResolver,
    session::CurrentSchema,
    writer::SchemaWriter,
};

/// Pattern matching schema-definition file names within a layer root.
const SCHEMA_FILE_PATTERN: &str = r"(?:^|[/\\])strata\.schema\.\w+$";

/// Handle to a running watch coordinator.
///
/// Dropping or closing the handle releases every file subscription; the
/// session closes it unconditionally on shutdown.
pub struct WatchHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl WatchHandle {
    fn disabled() -> Self {
        Self {
            shutdown: None,
            task: None,
        }
    }

    /// Whether a watcher backend is actually running.
    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// Stops the coordinator and releases its file subscriptions.
    pub fn close(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.task.take();
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Starts watching layer roots for schema-file changes.
///
/// Watcher initialization failures degrade (warn + fallback, then warn +
/// disabled); this function never fails session startup.
pub fn start(
    options: Arc<SchemaOptions>,
    hooks: SharedHooks,
    current: CurrentSchema,
) -> WatchHandle {
    let pattern = match Regex::new(SCHEMA_FILE_PATTERN) {
        Ok(pattern) => pattern,
        Err(error) => {
            warn!(%error, "invalid schema file pattern, live schema reload disabled");
            return WatchHandle::disabled();
        }
    };

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let Some(mut backend) = WatchBackend::init(events_tx) else {
        return WatchHandle::disabled();
    };

    for layer in &options.layers {
        if let Err(error) = backend.watch_dir(&layer.root_dir) {
            warn!(layer = %layer.name, %error, "unable to watch layer root");
        }
    }

    info!(backend = backend.kind(), "watching layer roots for schema changes");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let pipeline = Pipeline {
        delay: options.debounce,
        pattern,
        resolver: SchemaResolver::new(Arc::clone(&options), Arc::clone(&hooks)),
        writer: SchemaWriter::new(options, hooks),
        current,
    };

    let task = tokio::spawn(drive(backend, events_rx, shutdown_rx, pipeline));

    WatchHandle {
        shutdown: Some(shutdown_tx),
        task: Some(task),
    }
}

/// Everything one resolve+write cycle needs, owned by the driver task.
struct Pipeline {
    delay: std::time::Duration,
    pattern: Regex,
    resolver: SchemaResolver,
    writer: SchemaWriter,
    current: CurrentSchema,
}

async fn drive(
    backend: WatchBackend,
    mut events: mpsc::UnboundedReceiver<std::path::PathBuf>,
    mut shutdown: oneshot::Receiver<()>,
    pipeline: Pipeline,
) {
    let delay = pipeline.delay;
    let mut debouncer = Debouncer::new(delay);

    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,

            maybe_path = events.recv() => {
                match maybe_path {
                    Some(path) if pipeline.pattern.is_match(&path.to_string_lossy()) => {
                        debug!(path = %path.display(), "schema file changed");
                        debouncer.trigger(Instant::now());
                        sleep.as_mut().reset(tokio::time::Instant::now() + delay);
                    }
                    Some(_) => {}
                    None => break,
                }
            }

            () = &mut sleep, if debouncer.is_pending() => {
                if debouncer.fire(Instant::now()) {
                    run_cycle(&pipeline).await;
                }
            }
        }
    }

    // Dropping the backend releases every file subscription.
    drop(backend);
}

/// One resolve+write cycle. Failures are logged, never propagated: the watch
/// loop outlives any individual bad edit.
async fn run_cycle(pipeline: &Pipeline) {
    match pipeline.resolver.resolve().await {
        Ok(schema) => {
            if let Err(error) = pipeline.writer.write(&schema).await {
                error!(%error, "failed to write schema after change");
            }

            let mut guard = match pipeline.current.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *guard = Some(schema);
        }
        Err(error) => error!(%error, "schema re-resolution failed"),
    }
}
