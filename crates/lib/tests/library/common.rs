//! Shared helpers for library integration tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cordbuild_lib::artifact::{ArtifactBuilder, BundleError, BundleOutput, BundleRequest, Bundler, OutputFile};
use cordbuild_lib::config::{BuildConfig, Mode};
use cordbuild_lib::consts::REQUIRED_BROWSER_ENV;
use cordbuild_lib::schedule::{RunOptions, Scheduler};
use tempfile::TempDir;

/// What the fake bundler does for entry points containing a given substring.
#[derive(Debug, Clone)]
pub enum Behavior {
  /// Wait, then fail like a compile error.
  FailAfter(Duration),
}

/// In-memory bundler. Emits a JS file naming the entry point and the version
/// define, and records every entry it was asked to bundle.
#[derive(Default)]
pub struct FakeBundler {
  behaviors: Vec<(String, Behavior)>,
  calls: Mutex<Vec<PathBuf>>,
}

impl FakeBundler {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, entry_contains: &str, behavior: Behavior) -> Self {
    self.behaviors.push((entry_contains.to_string(), behavior));
    self
  }

  /// Number of bundles requested for entries containing `entry_contains`.
  pub fn calls_for(&self, entry_contains: &str) -> usize {
    self
      .calls
      .lock()
      .unwrap()
      .iter()
      .filter(|p| p.to_string_lossy().contains(entry_contains))
      .count()
  }
}

#[async_trait]
impl Bundler for FakeBundler {
  async fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput, BundleError> {
    let entry = request.entry_points[0].clone();
    self.calls.lock().unwrap().push(entry.clone());

    for (needle, behavior) in &self.behaviors {
      if entry.to_string_lossy().contains(needle.as_str()) {
        match behavior {
          Behavior::FailAfter(delay) => {
            tokio::time::sleep(*delay).await;
            return Err(BundleError::Other(format!("could not compile {}", entry.display())));
          }
        }
      }
    }

    let version = request
      .define
      .get("BUILDCONSTANTS.version")
      .cloned()
      .unwrap_or_default();

    let mut files = vec![OutputFile {
      name: "output.js".to_string(),
      text: format!("// {}\nconst version = {};\n", entry.display(), version),
    }];
    if request.sourcemap {
      files.push(OutputFile {
        name: "output.js.map".to_string(),
        text: "{\"version\":3}".to_string(),
      });
    }

    Ok(BundleOutput { files, metafile: None })
  }
}

/// A temporary Cord workspace with a `package.json` and every browser
/// environment field defined.
pub struct TestWorkspace {
  pub temp: TempDir,
}

impl TestWorkspace {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::write(
      temp.path().join("package.json"),
      r#"{ "version": "2.0.0", "dependencies": { "pg": "^8" } }"#,
    )
    .unwrap();
    Self { temp }
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.root().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn config(&self, mode: Mode) -> BuildConfig {
    let env: BTreeMap<String, String> = REQUIRED_BROWSER_ENV
      .iter()
      .map(|k| (k.to_string(), "test".to_string()))
      .collect();
    BuildConfig::load_with_env(self.root(), mode, false, env).unwrap()
  }

  /// Path under the resolved output directory.
  pub fn output(&self, config: &BuildConfig, relative: &str) -> PathBuf {
    config.output_path(relative)
  }
}

pub fn scheduler(config: BuildConfig, bundler: Arc<FakeBundler>, options: RunOptions) -> Scheduler {
  Scheduler::new(Arc::new(ArtifactBuilder::new(bundler, Arc::new(config))), options)
}

/// Poll `check` every 20ms until it holds or `timeout` passes.
pub async fn eventually(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
  let deadline = tokio::time::Instant::now() + timeout;
  while tokio::time::Instant::now() < deadline {
    if check() {
      return true;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
  }
  check()
}
