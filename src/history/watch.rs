//! Live filesystem watch feeding the history store.
//!
//! A recursive watcher over the configured roots turns create and modify
//! notifications into [`ActivityEvent`]s on a channel. The OS watcher
//! delivers callbacks on its own thread; nothing here touches the store.
//! Whoever owns the [`HistoryStore`](crate::history::HistoryStore) drains
//! the channel and ingests, keeping a single writer.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Errors from starting the watch.
#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    /// The platform watcher could not be created.
    #[error("failed to start filesystem watcher: {0}")]
    Init(#[from] notify::Error),
}

/// One observed filesystem change, ready for ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEvent {
    pub path: PathBuf,
    /// Probed when the event arrives. A path that vanished before the
    /// probe reports as a file, which errs toward recording it.
    pub is_directory: bool,
}

/// Handle to a running recursive watch over a set of roots.
///
/// Dropping the handle stops the watch.
pub struct FileWatch {
    _watcher: RecommendedWatcher,
    rx: Receiver<ActivityEvent>,
    watched: usize,
}

impl FileWatch {
    /// Start watching every root that currently exists.
    ///
    /// Missing roots are skipped the same way scans skip them; a watch
    /// over zero roots is valid and simply never delivers events.
    pub fn start(roots: &[PathBuf]) -> Result<Self, WatchError> {
        let (tx, rx) = std::sync::mpsc::channel();

        let mut watcher =
            notify::recommended_watcher(move |result: Result<Event, notify::Error>| {
                match result {
                    Ok(event) => forward(&tx, event),
                    Err(err) => log::warn!("Watch error: {err}"),
                }
            })?;

        let mut watched = 0;
        for root in roots {
            if !root.exists() {
                log::debug!("Not watching missing root {}", root.display());
                continue;
            }
            match watcher.watch(root, RecursiveMode::Recursive) {
                Ok(()) => watched += 1,
                Err(err) => log::warn!("Could not watch {}: {err}", root.display()),
            }
        }
        log::info!("Watching {watched} of {} configured roots", roots.len());

        Ok(Self {
            _watcher: watcher,
            rx,
            watched,
        })
    }

    /// Number of roots actually under watch.
    #[must_use]
    pub fn watched_roots(&self) -> usize {
        self.watched
    }

    /// Next event, or `None` if nothing arrived within `timeout`.
    ///
    /// The timeout keeps the drain loop responsive to cancellation
    /// without busy-waiting.
    #[must_use]
    pub fn try_next(&self, timeout: Duration) -> Option<ActivityEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}

/// Turn one notification into activity events, dropping everything that is
/// not a create or modify.
fn forward(tx: &Sender<ActivityEvent>, event: Event) {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return;
    }
    for path in event.paths {
        let is_directory = path.is_dir();
        let _ = tx.send(ActivityEvent { path, is_directory });
    }
}
