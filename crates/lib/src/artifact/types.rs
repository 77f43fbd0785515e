//! Types for artifact building.
//!
//! This module defines the declarative bundle description ([`BundleSpec`]),
//! the resolved request handed to a bundler ([`BundleRequest`]), the raw
//! bundler output, and the finished [`Artifact`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::Mode;
use crate::util::hash::ContentHash;

/// Runtime a bundle is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
  Browser,
  Node,
}

impl Platform {
  pub fn as_str(self) -> &'static str {
    match self {
      Platform::Browser => "browser",
      Platform::Node => "node",
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Module format of the emitted JavaScript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
  Iife,
  Esm,
  Cjs,
}

impl Format {
  pub fn as_str(self) -> &'static str {
    match self {
      Format::Iife => "iife",
      Format::Esm => "esm",
      Format::Cjs => "cjs",
    }
  }
}

/// Handlers for non-JavaScript sources every bundle is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetPlugin {
  /// `.graphql` / `.gql` documents.
  Graphql,
  /// SVG files imported as components.
  SvgComponent,
  /// Zero-runtime CSS-in-JS (`.css.ts`) extracted into the CSS bundle.
  VanillaExtract,
}

/// The fixed plugin set shared by browser and node builds.
pub const DEFAULT_PLUGINS: &[AssetPlugin] = &[AssetPlugin::Graphql, AssetPlugin::SvgComponent, AssetPlugin::VanillaExtract];

/// Computes a concrete output path from the content hash and the final JS text.
pub type OutputPathFn = dyn Fn(&ContentHash, &str) -> Option<PathBuf> + Send + Sync;

/// Where the JavaScript bundle is written.
#[derive(Clone)]
pub enum OutputPath {
  /// A fixed absolute path.
  Fixed(PathBuf),
  /// Called once per build, after the JS text is known. Returning `None`
  /// discards the bundle.
  ContentAddressed(Arc<OutputPathFn>),
}

impl OutputPath {
  pub fn content_addressed<F>(f: F) -> Self
  where
    F: Fn(&ContentHash, &str) -> Option<PathBuf> + Send + Sync + 'static,
  {
    OutputPath::ContentAddressed(Arc::new(f))
  }

  /// Resolve the concrete path for a finished bundle.
  pub fn resolve(&self, hash: &ContentHash, js: &str) -> Option<PathBuf> {
    match self {
      OutputPath::Fixed(path) => Some(path.clone()),
      OutputPath::ContentAddressed(f) => f(hash, js),
    }
  }
}

impl fmt::Debug for OutputPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OutputPath::Fixed(path) => f.debug_tuple("Fixed").field(path).finish(),
      OutputPath::ContentAddressed(_) => f.write_str("ContentAddressed(..)"),
    }
  }
}

/// Association with an error-reporting (Sentry) project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentryTarget {
  pub project: Option<String>,
  /// URL prefix the uploaded files are served under.
  pub prefix: Option<String>,
}

impl SentryTarget {
  pub fn project(project: &str) -> Self {
    Self {
      project: Some(project.to_string()),
      prefix: None,
    }
  }

  pub fn with_prefix(mut self, prefix: &str) -> Self {
    self.prefix = Some(prefix.to_string());
    self
  }
}

/// Declarative description of one bundler invocation.
#[derive(Debug, Clone)]
pub struct BundleSpec {
  /// Entry points, relative to the workspace root.
  pub entry_points: Vec<PathBuf>,
  pub platform: Platform,
  /// Overrides the platform's default module format.
  pub format: Option<Format>,
  pub outfile: OutputPath,
  /// Where the CSS bundle goes, if the build yields one.
  pub outfile_css: Option<PathBuf>,
  pub sentry: Option<SentryTarget>,
  /// Extra compile-time constants; these win over the built-in ones.
  pub define: BTreeMap<String, String>,
  pub deployment: Option<String>,
  /// Process name for server-side logging (node builds only).
  pub logging_process_name: Option<String>,
  /// Text prepended to the JS output, e.g. an interpreter line.
  pub banner: Option<String>,
}

impl BundleSpec {
  pub fn new(entry: impl Into<PathBuf>, platform: Platform, outfile: OutputPath) -> Self {
    Self {
      entry_points: vec![entry.into()],
      platform,
      format: None,
      outfile,
      outfile_css: None,
      sentry: None,
      define: BTreeMap::new(),
      deployment: None,
      logging_process_name: None,
      banner: None,
    }
  }
}

/// Fully resolved options handed to a [`Bundler`](super::Bundler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
  /// Absolute entry point paths.
  pub entry_points: Vec<PathBuf>,
  pub platform: Platform,
  pub format: Option<Format>,
  /// Compatibility targets (`es2019`, `node18`, ...).
  pub targets: Vec<String>,
  pub minify: bool,
  /// Module names left as runtime imports.
  pub external: Vec<String>,
  /// Compile-time constants; values are JavaScript expressions.
  pub define: BTreeMap<String, String>,
  pub alias: BTreeMap<String, String>,
  pub plugins: Vec<AssetPlugin>,
  pub banner: Option<String>,
  /// Produce an external sourcemap.
  pub sourcemap: bool,
  /// Produce a JSON metafile.
  pub metafile: bool,
  /// Directory module resolution starts from.
  pub working_dir: PathBuf,
}

/// One file produced by the bundler, named relative to the virtual output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
  pub name: String,
  pub text: String,
}

/// Raw bundler result. Nothing has been written to its final location yet.
#[derive(Debug, Clone, Default)]
pub struct BundleOutput {
  pub files: Vec<OutputFile>,
  pub metafile: Option<String>,
}

/// A finished artifact.
#[derive(Debug, Clone)]
pub struct Artifact {
  /// The JavaScript as written, including any sourcemap reference.
  pub js: String,
  pub css: Option<String>,
  pub sourcemap: Option<String>,
  pub metafile: Option<String>,
  /// Hash of the bundler's JavaScript output.
  pub content_hash: ContentHash,
  /// Where the JavaScript was written; `None` if no path resolved.
  pub outpath: Option<PathBuf>,
}

/// Whether a build produces a sourcemap, and whether the JS links to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcemapPolicy {
  pub produce: bool,
  pub link: bool,
}

impl SourcemapPolicy {
  /// Sourcemaps are always produced for development and server builds.
  /// Production browser bundles only get one when an error-reporting project
  /// will receive it, and never reference it from the public file.
  pub fn new(mode: Mode, platform: Platform, has_sentry: bool) -> Self {
    let link = mode.is_development() || platform == Platform::Node;
    Self {
      produce: link || has_sentry,
      link,
    }
  }
}

/// Errors from a bundler invocation.
#[derive(Debug, Error)]
pub enum BundleError {
  #[error("failed to run bundler {binary}: {source}")]
  Spawn {
    binary: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("bundler failed with exit code {code:?}: {stderr}")]
  Failed { code: Option<i32>, stderr: String },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("bundler error: {0}")]
  Other(String),
}

/// Errors that can occur while building an artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
  #[error("{0} must be defined in the process environment")]
  MissingEnv(String),

  #[error("{0} contains a SECRET placeholder")]
  SecretPlaceholder(String),

  #[error("bundler did not return JavaScript output")]
  NoJavaScript,

  #[error(transparent)]
  Bundle(#[from] BundleError),

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
