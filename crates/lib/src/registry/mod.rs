//! Target registry.
//!
//! Assembled once at startup in two phases: the static table of built-in
//! targets, then every [`DiscoveryProvider`]. The result is immutable.

mod builtin;
mod scripts;
mod types;

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::BuildConfig;
use crate::target::Target;

pub use builtin::builtin_targets;
pub use scripts::ScriptDiscovery;
pub use types::{DiscoveryProvider, RegistryError};

/// Immutable mapping of target name to target.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
  targets: BTreeMap<String, Target>,
}

impl TargetRegistry {
  /// Assemble the registry from static targets and discovery providers.
  ///
  /// Static entries win over discovered ones with the same name. Each
  /// provider's group composite is registered even when it found nothing.
  ///
  /// # Errors
  ///
  /// Returns the first provider error.
  pub fn assemble(
    config: &BuildConfig,
    static_targets: Vec<(String, Target)>,
    providers: &[&dyn DiscoveryProvider],
  ) -> Result<Self, RegistryError> {
    let mut targets: BTreeMap<String, Target> = static_targets.into_iter().collect();

    for provider in providers {
      let discovered = provider.discover(config)?;
      let mut group = Vec::with_capacity(discovered.len());

      for (name, target) in discovered {
        group.push(target.clone());
        if targets.contains_key(&name) {
          warn!(target_name = %name, "discovered target shadows a registered one, keeping the registered target");
          continue;
        }
        targets.insert(name, target);
      }

      debug!(group = provider.group(), count = group.len(), "registered discovered targets");
      targets.insert(provider.group().to_string(), Target::Composite(group));
    }

    Ok(Self { targets })
  }

  /// The full Cord registry: built-in surfaces plus scripts matching the
  /// configured patterns.
  pub fn for_config(config: &BuildConfig) -> Result<Self, RegistryError> {
    let scripts = ScriptDiscovery::from_config(config);
    Self::assemble(config, builtin_targets(config), &[&scripts])
  }

  pub fn get(&self, name: &str) -> Option<&Target> {
    self.targets.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.targets.contains_key(name)
  }

  /// Registered names in sorted order.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.targets.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.targets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.targets.is_empty()
  }
}

impl FromIterator<(String, Target)> for TargetRegistry {
  fn from_iter<I: IntoIterator<Item = (String, Target)>>(iter: I) -> Self {
    Self {
      targets: iter.into_iter().collect(),
    }
  }
}
