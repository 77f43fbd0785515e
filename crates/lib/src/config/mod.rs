//! Build configuration.
//!
//! Resolves, once per process:
//! - the build [`Mode`]
//! - the workspace root and output directory
//! - `package.json` (released version, externalized dependencies)
//! - the optional `cordbuild.toml` settings file
//! - a snapshot of the process environment
//!
//! The per-build [`BuildVersion`] is not fixed here: [`BuildConfig::next_version`]
//! is called by the scheduler right before every build.

mod types;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::consts::{DEFAULT_ESBUILD, DEFAULT_OUTPUT_DIR, OUTPUT_DIR_ENV, PACKAGE_JSON, SETTINGS_FILENAME};

pub use types::{BuildVersion, ConfigError, Mode, PackageInfo, SentrySettings, Settings};

/// Process-wide build configuration.
#[derive(Debug, Clone)]
pub struct BuildConfig {
  pub mode: Mode,
  /// Workspace root; relative entry points and watch paths resolve against it.
  pub root: PathBuf,
  /// Absolute output root.
  pub output_dir: PathBuf,
  /// Whether bundles write a `.meta` analysis file next to their output.
  pub metafile: bool,
  pub package: PackageInfo,
  pub settings: Settings,
  /// Environment snapshot taken at startup.
  pub env: BTreeMap<String, String>,
}

impl BuildConfig {
  /// Load configuration for the workspace at `root`, reading the process environment.
  ///
  /// # Errors
  ///
  /// Fails if `package.json` is missing or malformed, or if `cordbuild.toml`
  /// exists but cannot be parsed.
  pub fn load(root: &Path, mode: Mode, metafile: bool) -> Result<Self, ConfigError> {
    Self::load_with_env(root, mode, metafile, process_env())
  }

  /// Load configuration with an explicit environment.
  pub fn load_with_env(
    root: &Path,
    mode: Mode,
    metafile: bool,
    env: BTreeMap<String, String>,
  ) -> Result<Self, ConfigError> {
    let root = dunce::canonicalize(root).map_err(|source| ConfigError::Read {
      path: root.to_path_buf(),
      source,
    })?;

    let package = read_package(&root.join(PACKAGE_JSON))?;
    let settings = read_settings(&root.join(SETTINGS_FILENAME))?;

    let output_dir = env
      .get(OUTPUT_DIR_ENV)
      .cloned()
      .or_else(|| settings.output_dir.clone())
      .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());
    let output_dir = root.join(output_dir);

    debug!(
      root = %root.display(),
      output = %output_dir.display(),
      version = %package.version,
      "loaded build configuration"
    );

    Ok(Self {
      mode,
      root,
      output_dir,
      metafile,
      package,
      settings,
      env,
    })
  }

  /// Build a configuration from parts, without touching the filesystem.
  pub fn from_parts(root: PathBuf, mode: Mode, package: PackageInfo, env: BTreeMap<String, String>) -> Self {
    let output_dir = root.join(DEFAULT_OUTPUT_DIR);
    Self {
      mode,
      root,
      output_dir,
      metafile: false,
      package,
      settings: Settings::default(),
      env,
    }
  }

  /// Compute the version for a build that is about to start.
  ///
  /// Development builds get `dev-<unix millis>`; production builds use the
  /// released package version.
  pub fn next_version(&self) -> BuildVersion {
    match self.mode {
      Mode::Development => {
        let millis = SystemTime::now()
          .duration_since(UNIX_EPOCH)
          .map(|d| d.as_millis())
          .unwrap_or_default();
        BuildVersion(format!("dev-{}", millis))
      }
      Mode::Production => BuildVersion(self.package.version.clone()),
    }
  }

  /// Fixed path segment for versioned assets.
  pub fn version_path(&self) -> &str {
    match self.mode {
      Mode::Development => "dev",
      Mode::Production => &self.package.version,
    }
  }

  /// Resolve a path under the output root.
  pub fn output_path(&self, relative: impl AsRef<Path>) -> PathBuf {
    self.output_dir.join(relative)
  }

  /// Resolve a path under the workspace root.
  pub fn source_path(&self, relative: impl AsRef<Path>) -> PathBuf {
    self.root.join(relative)
  }

  pub fn env_var(&self, key: &str) -> Option<&str> {
    self.env.get(key).map(String::as_str)
  }

  pub fn esbuild_path(&self) -> PathBuf {
    let configured = self
      .settings
      .esbuild
      .clone()
      .unwrap_or_else(|| PathBuf::from(DEFAULT_ESBUILD));
    self.root.join(configured)
  }

  pub fn sentry_dsn(&self, project: &str) -> Option<&str> {
    self.settings.sentry.dsns.get(project).map(String::as_str)
  }
}

/// Snapshot the process environment. Entries whose name or value is not valid
/// UTF-8 cannot be injected into a bundle and are skipped.
fn process_env() -> BTreeMap<String, String> {
  std::env::vars_os()
    .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
      (Ok(key), Ok(value)) => Some((key, value)),
      (key, _) => {
        debug!(key = ?key, "skipping non UTF-8 environment entry");
        None
      }
    })
    .collect()
}

fn read_package(path: &Path) -> Result<PackageInfo, ConfigError> {
  let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  serde_json::from_str(&content).map_err(|source| ConfigError::PackageJson {
    path: path.to_path_buf(),
    source,
  })
}

fn read_settings(path: &Path) -> Result<Settings, ConfigError> {
  if !path.exists() {
    return Ok(Settings::default());
  }

  let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  toml::from_str(&content).map_err(|source| ConfigError::Settings {
    path: path.to_path_buf(),
    source,
  })
}
