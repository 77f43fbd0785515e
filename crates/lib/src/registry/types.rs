//! Registry types.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::BuildConfig;
use crate::target::Target;

/// A source of targets found at startup rather than declared statically.
///
/// Every target a provider returns is registered under its own name and,
/// together with its siblings, under the provider's [`group`](Self::group)
/// name as one composite.
pub trait DiscoveryProvider: Send + Sync {
  /// Name of the composite holding everything this provider discovers.
  fn group(&self) -> &str;

  /// Scan for targets. Called once, before any build starts.
  ///
  /// # Errors
  ///
  /// Fails only when the provider is misconfigured. Finding nothing is an
  /// empty result, not an error.
  fn discover(&self, config: &BuildConfig) -> Result<Vec<(String, Target)>, RegistryError>;
}

/// Errors that can occur while assembling the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("invalid glob pattern '{pattern}': {message}")]
  Pattern { pattern: String, message: String },

  #[error("targets '{first}' and '{second}' would both write {output}")]
  OutputClash {
    first: String,
    second: String,
    output: PathBuf,
  },
}
