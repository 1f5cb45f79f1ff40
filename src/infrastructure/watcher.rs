//! Change notification for the chat log.
//!
//! Producers append from other processes, so the log's directory is watched
//! with `notify` and events for the log file are forwarded over a channel.
//! Bursts of events are coalesced into one change.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::domain::{AppError, Result};

/// Watches one file for writes, creation and removal.
#[derive(Debug)]
pub struct LogWatcher {
    path: PathBuf,
    events: mpsc::UnboundedReceiver<()>,
    _watcher: RecommendedWatcher,
}

impl LogWatcher {
    /// Start watching the directory holding `path`.
    ///
    /// # Errors
    /// Returns error if the directory cannot be watched.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let dir = watch_dir(&path);
        let file_name = path.file_name().map(OsString::from);

        let (tx, events) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    tracing::trace!(?event, "Raw file system event");
                    if is_log_change(&event, file_name.as_deref()) && tx.send(()).is_err() {
                        tracing::debug!("Watcher receiver dropped");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "File watcher error"),
            }
        })
        .map_err(|e| AppError::watch("Failed to create file watcher", e))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| AppError::watch(format!("Failed to watch {}", dir.display()), e))?;

        tracing::debug!(path = %path.display(), "Watching chat log");
        Ok(Self {
            path,
            events,
            _watcher: watcher,
        })
    }

    /// Path of the watched file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the next change. Returns `false` once the watcher is gone.
    pub async fn changed(&mut self) -> bool {
        self.events.recv().await.is_some()
    }

    /// Discard changes already queued.
    pub fn drain(&mut self) -> usize {
        let mut dropped = 0;
        while self.events.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }

    /// Call `on_change` after each change until Ctrl-C. Events arriving
    /// within `debounce` of the first one are folded into the same call.
    pub async fn run<F>(mut self, debounce: Duration, mut on_change: F)
    where
        F: FnMut(),
    {
        loop {
            tokio::select! {
                alive = self.changed() => {
                    if !alive {
                        tracing::warn!("File watcher stopped");
                        break;
                    }
                    tokio::time::sleep(debounce).await;
                    let folded = self.drain();
                    tracing::debug!(path = %self.path.display(), folded, "Chat log changed");
                    on_change();
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Stopping watcher");
                    break;
                }
            }
        }
    }
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Whether `event` is a content or existence change of the log file.
///
/// Access events are dropped: re-rendering reads the log, and reads must
/// not trigger another render.
fn is_log_change(event: &Event, file_name: Option<&std::ffi::OsStr>) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    event
        .paths
        .iter()
        .any(|p| p.file_name().is_some_and(|name| Some(name) == file_name))
}
