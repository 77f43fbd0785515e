//! Build targets.
//!
//! A [`Target`] is either a leaf implementing [`BuildTarget`] or a composite of
//! other targets. [`BundleTarget`] is the declarative leaf used by every
//! built-in and discovered target: a list of bundles, the paths to remove on
//! clean, the paths to watch and optional static copies.

mod types;

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::artifact::BundleSpec;
use crate::util::fs::{copy_recursive, remove_path};

pub use types::{BuildContext, BuildTarget, CopySpec, Target, TargetError};

/// A leaf target made of one or more bundler invocations.
#[derive(Debug, Clone, Default)]
pub struct BundleTarget {
  pub bundles: Vec<BundleSpec>,
  /// Removed on clean, relative to the output directory.
  pub clean_paths: Vec<PathBuf>,
  pub watch: Vec<String>,
  pub copies: Vec<CopySpec>,
}

impl BundleTarget {
  pub fn new(bundle: BundleSpec) -> Self {
    Self {
      bundles: vec![bundle],
      ..Default::default()
    }
  }

  pub fn cleans(mut self, path: impl Into<PathBuf>) -> Self {
    self.clean_paths.push(path.into());
    self
  }

  pub fn watches(mut self, path: &str) -> Self {
    self.watch.push(path.to_string());
    self
  }

  pub fn copies(mut self, from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
    self.copies.push(CopySpec {
      from: from.into(),
      to: to.into(),
    });
    self
  }
}

#[async_trait]
impl BuildTarget for BundleTarget {
  fn watch_paths(&self) -> &[String] {
    &self.watch
  }

  async fn clean(&self, ctx: &BuildContext) -> Result<(), TargetError> {
    let config = ctx.artifacts.config();

    for rel in &self.clean_paths {
      let path = config.output_path(rel);
      remove_path(&path)
        .await
        .map_err(|source| TargetError::Clean { path, source })?;
    }

    Ok(())
  }

  async fn build(&self, ctx: &BuildContext) -> Result<(), TargetError> {
    for bundle in &self.bundles {
      let artifact = ctx.artifacts.build(bundle, &ctx.version).await?;
      if let Some(outpath) = &artifact.outpath {
        debug!(path = %outpath.display(), hash = %artifact.content_hash.prefix(12), "wrote bundle");
      }
    }

    let config = ctx.artifacts.config();
    for copy in &self.copies {
      let from = config.source_path(&copy.from);
      let to = config.output_path(&copy.to);
      copy_recursive(&from, &to)
        .await
        .map_err(|source| TargetError::Copy { from, to, source })?;
    }

    Ok(())
  }
}
