//! Scheduler types.

use std::time::Duration;

use thiserror::Error;

use crate::consts::DEFAULT_DEBOUNCE;
use crate::target::TargetError;
use crate::watch::WatchError;

/// How selected targets are driven.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
  /// Keep running and rebuild on change.
  pub watch: bool,
  /// Clean each target before its first build.
  pub clean: bool,
  /// In watch mode, wait for the first change before building.
  pub skip_initial_build: bool,
  pub debounce: Duration,
}

impl Default for RunOptions {
  fn default() -> Self {
    Self {
      watch: false,
      clean: false,
      skip_initial_build: false,
      debounce: DEFAULT_DEBOUNCE,
    }
  }
}

/// Errors that end a scheduler run.
#[derive(Debug, Error)]
pub enum ScheduleError {
  #[error("target '{0}' is not registered")]
  UnknownTarget(String),

  #[error("failed to clean {target}: {source}")]
  Clean {
    target: String,
    #[source]
    source: TargetError,
  },

  #[error("build of {target} failed: {source}")]
  BuildFailed {
    target: String,
    #[source]
    source: TargetError,
  },

  #[error("failed to watch {target}: {source}")]
  Watch {
    target: String,
    #[source]
    source: WatchError,
  },

  #[error("build task failed: {0}")]
  Task(String),
}
