//! Target data model.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::artifact::{ArtifactBuilder, ArtifactError};
use crate::config::BuildVersion;

/// Everything one build invocation needs from the outside.
#[derive(Clone)]
pub struct BuildContext {
  /// Version computed right before this build was dispatched.
  pub version: BuildVersion,
  pub artifacts: Arc<ArtifactBuilder>,
}

/// A leaf build unit.
#[async_trait]
pub trait BuildTarget: Send + Sync {
  /// Paths, relative to the workspace root, whose changes trigger a rebuild.
  fn watch_paths(&self) -> &[String];

  /// Remove everything a previous build wrote.
  async fn clean(&self, ctx: &BuildContext) -> Result<(), TargetError>;

  async fn build(&self, ctx: &BuildContext) -> Result<(), TargetError>;
}

/// A registered target: either a single build unit or an ordered group of
/// targets built concurrently.
#[derive(Clone)]
pub enum Target {
  Leaf(Arc<dyn BuildTarget>),
  Composite(Vec<Target>),
}

impl Target {
  pub fn leaf(target: impl BuildTarget + 'static) -> Self {
    Target::Leaf(Arc::new(target))
  }

  /// Number of leaf build units under this target.
  pub fn leaf_count(&self) -> usize {
    match self {
      Target::Leaf(_) => 1,
      Target::Composite(children) => children.iter().map(Target::leaf_count).sum(),
    }
  }
}

impl fmt::Debug for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Target::Leaf(leaf) => f.debug_struct("Leaf").field("watch", &leaf.watch_paths()).finish(),
      Target::Composite(children) => f.debug_tuple("Composite").field(children).finish(),
    }
  }
}

/// A static asset copy performed after bundling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySpec {
  /// Source, relative to the workspace root.
  pub from: PathBuf,
  /// Destination, relative to the output directory.
  pub to: PathBuf,
}

/// Errors from cleaning or building a target.
#[derive(Debug, Error)]
pub enum TargetError {
  #[error(transparent)]
  Artifact(#[from] ArtifactError),

  #[error("failed to remove {path}: {source}")]
  Clean {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to copy {from} to {to}: {source}")]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("{0}")]
  Failed(String),
}
