//! Discovery of ad-hoc script targets.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::artifact::{BundleSpec, Format, OutputPath, Platform};
use crate::config::BuildConfig;
use crate::consts::SCRIPTS_TARGET;
use crate::registry::types::{DiscoveryProvider, RegistryError};
use crate::target::{BundleTarget, Target};

/// Finds script files by glob and bundles each one as a CommonJS node script
/// under `scripts/`, mirroring its directory below the workspace `scripts/`.
#[derive(Debug, Clone)]
pub struct ScriptDiscovery {
  patterns: Vec<String>,
}

impl ScriptDiscovery {
  pub fn new(patterns: Vec<String>) -> Self {
    Self { patterns }
  }

  pub fn from_config(config: &BuildConfig) -> Self {
    Self::new(config.settings.script_patterns.clone())
  }
}

impl DiscoveryProvider for ScriptDiscovery {
  fn group(&self) -> &str {
    SCRIPTS_TARGET
  }

  fn discover(&self, config: &BuildConfig) -> Result<Vec<(String, Target)>, RegistryError> {
    let mut found = Vec::new();
    let mut outputs: BTreeMap<PathBuf, String> = BTreeMap::new();

    for pattern in &self.patterns {
      let full_pattern = config.root.join(pattern).display().to_string();

      let mut paths: Vec<_> = glob::glob(&full_pattern)
        .map_err(|e| RegistryError::Pattern {
          pattern: pattern.clone(),
          message: e.to_string(),
        })?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();

      paths.sort();
      debug!(pattern = %pattern, matches = paths.len(), "scanned for scripts");

      for path in paths {
        let relative = path.strip_prefix(&config.root).unwrap_or(&path);
        let Some(output) = script_output(relative) else {
          continue;
        };
        let name = relative.to_string_lossy().replace('\\', "/");

        match outputs.get(&output) {
          // Overlapping patterns matched the same file.
          Some(owner) if *owner == name => continue,
          Some(owner) => {
            return Err(RegistryError::OutputClash {
              first: owner.clone(),
              second: name,
              output,
            });
          }
          None => {}
        }

        outputs.insert(output.clone(), name.clone());
        found.push((name, script_target(config, relative, &output)));
      }
    }

    Ok(found)
  }
}

/// Output path, relative to the output directory: `scripts/seed.ts` becomes
/// `scripts/seed.cjs`, `scripts/ci/deploy.ts` becomes `scripts/ci/deploy.cjs`
/// and `ops/aws/scripts/rotate.ts` becomes `scripts/ops/aws/scripts/rotate.cjs`.
fn script_output(relative: &Path) -> Option<PathBuf> {
  relative.file_stem()?;
  let mirrored = relative.strip_prefix("scripts").unwrap_or(relative);
  Some(Path::new("scripts").join(mirrored).with_extension("cjs"))
}

/// Target for one script, named by its path relative to the workspace root.
fn script_target(config: &BuildConfig, relative: &Path, output: &Path) -> Target {
  let stem = relative
    .file_stem()
    .map(|s| s.to_string_lossy().to_string())
    .unwrap_or_default();

  let mut bundle = BundleSpec::new(relative, Platform::Node, OutputPath::Fixed(config.output_path(output)));
  bundle.format = Some(Format::Cjs);
  bundle.logging_process_name = Some(stem);

  let watch_dir = relative
    .parent()
    .map(|p| format!("{}/", p.to_string_lossy().replace('\\', "/")))
    .unwrap_or_default();

  let target = BundleTarget::new(bundle)
    .cleans(output)
    .cleans(format!("{}.map", output.display()))
    .watches(&watch_dir)
    .watches("common/");

  Target::leaf(target)
}
