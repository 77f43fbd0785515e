//! Build scheduling.
//!
//! Every selected target is scheduled concurrently. For each one:
//! 1. Composites schedule their children concurrently as `name[i]`
//! 2. With `clean`, the leaf is cleaned before it is first built
//! 3. Without `watch`, the leaf is built once; a failure ends the run
//! 4. With `watch`, a coordinator and file watchers take over and the
//!    target never finishes

mod types;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::artifact::ArtifactBuilder;
use crate::registry::TargetRegistry;
use crate::target::{BuildContext, BuildTarget, Target};
use crate::util::text::format_duration;
use crate::watch::{BuildRunner, WatchCoordinator, WatchOptions, watch_paths};

pub use types::{RunOptions, ScheduleError};

type ScheduleFuture = Pin<Box<dyn Future<Output = Result<(), ScheduleError>> + Send>>;

/// Drives targets through clean, build and watch.
#[derive(Clone)]
pub struct Scheduler {
  artifacts: Arc<ArtifactBuilder>,
  options: RunOptions,
}

impl Scheduler {
  pub fn new(artifacts: Arc<ArtifactBuilder>, options: RunOptions) -> Self {
    Self { artifacts, options }
  }

  pub fn options(&self) -> &RunOptions {
    &self.options
  }

  /// Schedule every named target concurrently.
  ///
  /// In one-shot mode this resolves once all builds have finished, or with the
  /// first failure, abandoning builds still in flight. In watch mode it only
  /// resolves on a setup error.
  ///
  /// # Errors
  ///
  /// Returns the first clean, build or watch setup failure.
  pub async fn run(&self, registry: &TargetRegistry, names: &[String]) -> Result<(), ScheduleError> {
    let mut set = JoinSet::new();

    for name in names {
      let target = registry
        .get(name)
        .cloned()
        .ok_or_else(|| ScheduleError::UnknownTarget(name.clone()))?;
      set.spawn(self.schedule(name.clone(), target));
    }

    info!(targets = names.len(), watch = self.options.watch, "scheduling targets");
    join_all(set).await
  }

  /// Schedule one target under `label`.
  pub fn schedule(&self, label: String, target: Target) -> ScheduleFuture {
    let this = self.clone();

    Box::pin(async move {
      match target {
        Target::Composite(children) => {
          debug!(target_name = %label, children = children.len(), "scheduling composite");
          let mut set = JoinSet::new();
          for (i, child) in children.into_iter().enumerate() {
            set.spawn(this.schedule(format!("{}[{}]", label, i), child));
          }
          join_all(set).await
        }
        Target::Leaf(leaf) => this.schedule_leaf(label, leaf).await,
      }
    })
  }

  async fn schedule_leaf(&self, label: String, leaf: Arc<dyn BuildTarget>) -> Result<(), ScheduleError> {
    let runner = Arc::new(TargetRunner {
      label: label.clone(),
      leaf: leaf.clone(),
      artifacts: self.artifacts.clone(),
      watch: self.options.watch,
    });

    if self.options.clean {
      runner.clean().await?;
    }

    if !self.options.watch {
      return runner.run_one_build().await;
    }

    let handle = WatchCoordinator::spawn(
      label.clone(),
      runner,
      WatchOptions {
        debounce: self.options.debounce,
        skip_initial_build: self.options.skip_initial_build,
      },
    );

    let root = &self.artifacts.config().root;
    let watcher = watch_paths(&label, root, leaf.watch_paths(), handle.notifier())
      .map_err(|source| ScheduleError::Watch {
        target: label.clone(),
        source,
      })?;

    info!(target_name = %label, paths = watcher.watched(), "watching");

    // Watchers and the coordinator stay alive for the rest of the process.
    let _keep = (watcher, handle);
    std::future::pending::<()>().await;
    Ok(())
  }
}

async fn join_all(mut set: JoinSet<Result<(), ScheduleError>>) -> Result<(), ScheduleError> {
  while let Some(joined) = set.join_next().await {
    match joined {
      Ok(Ok(())) => {}
      Ok(Err(e)) => return Err(e),
      Err(e) => return Err(ScheduleError::Task(e.to_string())),
    }
  }
  Ok(())
}

/// Runs single builds of one leaf target.
struct TargetRunner {
  label: String,
  leaf: Arc<dyn BuildTarget>,
  artifacts: Arc<ArtifactBuilder>,
  watch: bool,
}

impl TargetRunner {
  fn context(&self) -> BuildContext {
    BuildContext {
      version: self.artifacts.config().next_version(),
      artifacts: self.artifacts.clone(),
    }
  }

  async fn clean(&self) -> Result<(), ScheduleError> {
    debug!(target_name = %self.label, "cleaning");
    self
      .leaf
      .clean(&self.context())
      .await
      .map_err(|source| ScheduleError::Clean {
        target: self.label.clone(),
        source,
      })
  }

  /// Build once with a freshly computed version, logging the outcome and the
  /// elapsed time.
  async fn run_one_build(&self) -> Result<(), ScheduleError> {
    let ctx = self.context();
    info!(target_name = %self.label, version = %ctx.version, "build started");

    let start = Instant::now();
    let result = self.leaf.build(&ctx).await;
    let elapsed = format_duration(start.elapsed());

    match result {
      Ok(()) => {
        info!(target_name = %self.label, elapsed = %elapsed, "build finished");
        Ok(())
      }
      Err(e) => {
        error!(target_name = %self.label, error = %e, "build failed");
        info!(target_name = %self.label, elapsed = %elapsed, "build finished");
        Err(ScheduleError::BuildFailed {
          target: self.label.clone(),
          source: e,
        })
      }
    }
  }
}

#[async_trait]
impl BuildRunner for TargetRunner {
  async fn run_build(&self) {
    if let Err(e) = self.run_one_build().await {
      // Logged by run_one_build; a failed rebuild must not stop watching.
      debug!(target_name = %self.label, watch = self.watch, error = %e, "rebuild failed, still watching");
    }
  }
}
