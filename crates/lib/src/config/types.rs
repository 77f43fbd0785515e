//! Configuration types.
//!
//! This module defines the build mode, the per-build version value, the
//! optional `cordbuild.toml` settings file and the subset of `package.json`
//! the build reads.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::consts::{DEFAULT_DEBOUNCE, DEFAULT_SCRIPT_PATTERNS, DEFAULT_SENTRY_ORG};

/// Build mode, fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
  Development,
  Production,
}

impl Mode {
  pub fn as_str(self) -> &'static str {
    match self {
      Mode::Development => "development",
      Mode::Production => "production",
    }
  }

  pub fn is_development(self) -> bool {
    matches!(self, Mode::Development)
  }
}

impl fmt::Display for Mode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Mode {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "development" => Ok(Mode::Development),
      "production" => Ok(Mode::Production),
      other => Err(ConfigError::InvalidMode(other.to_string())),
    }
  }
}

/// The version string baked into one build.
///
/// Computed immediately before each build is dispatched and passed down to
/// the artifact builder. Every development rebuild gets a distinct value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildVersion(pub String);

impl fmt::Display for BuildVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Contents of the optional `cordbuild.toml` settings file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Output root, relative to the workspace root. `CORD_BUILD_OUTPUT` wins over this.
  pub output_dir: Option<String>,
  /// Path of the esbuild executable, relative to the workspace root.
  pub esbuild: Option<PathBuf>,
  /// Glob patterns for ad-hoc script targets.
  pub script_patterns: Vec<String>,
  /// Settle window before a rebuild, in milliseconds.
  pub debounce_ms: u64,
  pub sentry: SentrySettings,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      output_dir: None,
      esbuild: None,
      script_patterns: DEFAULT_SCRIPT_PATTERNS.iter().map(|p| p.to_string()).collect(),
      debounce_ms: u64::try_from(DEFAULT_DEBOUNCE.as_millis()).unwrap_or(50),
      sentry: SentrySettings::default(),
    }
  }
}

impl Settings {
  pub fn debounce(&self) -> Duration {
    Duration::from_millis(self.debounce_ms)
  }
}

/// Error-reporting (Sentry) settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SentrySettings {
  pub org: String,
  /// DSN per project, injected into bundles as `BUILDCONSTANTS.sentryDSN`.
  pub dsns: BTreeMap<String, String>,
}

impl Default for SentrySettings {
  fn default() -> Self {
    Self {
      org: DEFAULT_SENTRY_ORG.to_string(),
      dsns: BTreeMap::new(),
    }
  }
}

/// The parts of `package.json` the build needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageInfo {
  pub version: String,
  #[serde(default)]
  pub dependencies: BTreeMap<String, serde_json::Value>,
  #[serde(default, rename = "devDependencies")]
  pub dev_dependencies: BTreeMap<String, serde_json::Value>,
}

impl PackageInfo {
  /// Module names left external in server bundles.
  pub fn external_dependencies(&self) -> Vec<String> {
    self
      .dependencies
      .keys()
      .chain(self.dev_dependencies.keys())
      .cloned()
      .collect()
  }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid mode '{0}': expected 'development' or 'production'")]
  InvalidMode(String),

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  PackageJson {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to parse {path}: {source}")]
  Settings {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}
