use std::{env, path::{Path, PathBuf}, time::Duration};

use notify::{Config, Event, EventKind, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::warn;

/// Environment flag selecting the watcher backend; set to `poll` to force
/// the portable fallback.
pub const WATCHER_ENV: &str = "STRATA_SCHEMA_WATCHER";

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// One of the two interchangeable file-watching backends.
///
/// The native backend uses the platform's change-notification facility; the
/// polling backend works anywhere at the cost of latency. Both feed the same
/// event channel, so the coordinator is indifferent to which one is active.
pub enum WatchBackend {
    /// Platform-native watcher (inotify, FSEvents, ReadDirectoryChangesW).
    Native(RecommendedWatcher),
    /// Portable polling watcher.
    Polling(PollWatcher),
}

impl WatchBackend {
    /// Initializes a backend, preferring the native watcher.
    ///
    /// If the native watcher cannot be initialized (or [`WATCHER_ENV`] is
    /// set to `poll`), falls back to the polling watcher after a warning. If
    /// both fail, returns `None` after a warning: the session continues
    /// without live schema reload, startup never fails.
    pub fn init(events: mpsc::UnboundedSender<PathBuf>) -> Option<WatchBackend> {
        let force_poll = env::var(WATCHER_ENV).is_ok_and(|value| value == "poll");

        if !force_poll {
            match notify::recommended_watcher(handler(events.clone())) {
                Ok(watcher) => return Some(WatchBackend::Native(watcher)),
                Err(error) => {
                    warn!(%error, "native file watcher unavailable, falling back to polling");
                }
            }
        }

        match PollWatcher::new(
            handler(events),
            Config::default().with_poll_interval(POLL_INTERVAL),
        ) {
            Ok(watcher) => Some(WatchBackend::Polling(watcher)),
            Err(error) => {
                warn!(%error, "polling watcher failed to initialize, live schema reload disabled");
                None
            }
        }
    }

    /// Starts watching a directory (non-recursive).
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the path cannot be watched.
    pub fn watch_dir(&mut self, dir: &Path) -> notify::Result<()> {
        match self {
            WatchBackend::Native(watcher) => watcher.watch(dir, RecursiveMode::NonRecursive),
            WatchBackend::Polling(watcher) => watcher.watch(dir, RecursiveMode::NonRecursive),
        }
    }

    /// Backend name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            WatchBackend::Native(_) => "native",
            WatchBackend::Polling(_) => "polling",
        }
    }
}

/// Bridges notify's callback interface onto the coordinator's channel.
/// Only content-affecting events pass through.
fn handler(events: mpsc::UnboundedSender<PathBuf>) -> impl Fn(notify::Result<Event>) + Send {
    move |result| {
        let Ok(event) = result else {
            return;
        };

        match event.kind {
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
            _ => return,
        }

        for path in event.paths {
            let _ = events.send(path);
        }
    }
}
