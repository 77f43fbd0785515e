//! Filesystem watching.
//!
//! Bridges `notify` events for a target's watch paths into its coordinator.

use std::path::Path;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tracing::{debug, warn};

use crate::watch::coordinator::ChangeNotifier;

/// Errors that can occur while setting up file watching.
#[derive(Debug, Error)]
pub enum WatchError {
  #[error("failed to create file watcher: {0}")]
  Create(#[source] notify::Error),

  #[error("failed to watch {path}: {source}")]
  Watch {
    path: String,
    #[source]
    source: notify::Error,
  },
}

/// Watches a set of paths for one target. Dropping it stops the watching.
pub struct FileWatcher {
  _watcher: RecommendedWatcher,
  watched: usize,
}

impl FileWatcher {
  /// Number of paths actually being watched.
  pub fn watched(&self) -> usize {
    self.watched
  }
}

/// Start watching `paths` (relative to `root`) recursively, forwarding every
/// relevant event to `notifier`. Paths that do not exist are skipped with a
/// warning.
///
/// # Errors
///
/// Fails if the platform watcher cannot be created or an existing path cannot
/// be watched.
pub fn watch_paths(
  label: &str,
  root: &Path,
  paths: &[String],
  notifier: ChangeNotifier,
) -> Result<FileWatcher, WatchError> {
  let target_name = label.to_string();
  let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
    Ok(event) if is_relevant(&event.kind) => {
      debug!(target_name = %target_name, paths = ?event.paths, "change detected");
      notifier.notify();
    }
    Ok(_) => {}
    Err(e) => warn!(target_name = %target_name, error = %e, "file watcher error"),
  })
  .map_err(WatchError::Create)?;

  let mut watched = 0;
  for path in paths {
    let full = root.join(path);
    if !full.exists() {
      warn!(target_name = %label, path = %path, "watch path does not exist, skipping");
      continue;
    }

    watcher
      .watch(&full, RecursiveMode::Recursive)
      .map_err(|source| WatchError::Watch {
        path: path.clone(),
        source,
      })?;
    watched += 1;
  }

  debug!(target_name = %label, watched, "watching for changes");

  Ok(FileWatcher {
    _watcher: watcher,
    watched,
  })
}

/// Reads do not change anything.
fn is_relevant(kind: &EventKind) -> bool {
  !matches!(kind, EventKind::Access(_))
}
