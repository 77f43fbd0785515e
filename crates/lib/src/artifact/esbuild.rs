//! esbuild CLI bundler.
//!
//! Runs the esbuild executable with its output pointed at a scratch directory,
//! then reads every produced file back so the artifact builder can place them.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::artifact::bundler::Bundler;
use crate::artifact::types::{AssetPlugin, BundleError, BundleOutput, BundleRequest, OutputFile};
use crate::consts::VIRTUAL_OUTFILE;

const METAFILE_NAME: &str = "metafile.json";

/// Bundles by spawning the esbuild command-line tool.
#[derive(Debug, Clone)]
pub struct EsbuildBundler {
  binary: PathBuf,
}

impl EsbuildBundler {
  pub fn new(binary: impl Into<PathBuf>) -> Self {
    Self { binary: binary.into() }
  }

  pub fn binary(&self) -> &Path {
    &self.binary
  }
}

#[async_trait]
impl Bundler for EsbuildBundler {
  async fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput, BundleError> {
    let scratch = tempfile::tempdir()?;
    let outfile = scratch.path().join(VIRTUAL_OUTFILE);
    let metafile = request.metafile.then(|| scratch.path().join(METAFILE_NAME));

    let args = esbuild_args(request, &outfile, metafile.as_deref());

    debug!(binary = %self.binary.display(), args = ?args, "spawning bundler");

    let output = Command::new(&self.binary)
      .args(&args)
      .current_dir(&request.working_dir)
      .output()
      .await
      .map_err(|source| BundleError::Spawn {
        binary: self.binary.clone(),
        source,
      })?;

    if !output.status.success() {
      return Err(BundleError::Failed {
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      });
    }

    let mut result = BundleOutput::default();
    let mut entries = tokio::fs::read_dir(scratch.path()).await?;

    while let Some(entry) = entries.next_entry().await? {
      if !entry.file_type().await?.is_file() {
        continue;
      }

      let name = entry.file_name().to_string_lossy().to_string();
      let text = tokio::fs::read_to_string(entry.path()).await?;

      if name == METAFILE_NAME {
        result.metafile = Some(text);
      } else {
        result.files.push(OutputFile { name, text });
      }
    }

    result.files.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(result)
  }
}

/// Build the esbuild command line for a request.
pub fn esbuild_args(request: &BundleRequest, outfile: &Path, metafile: Option<&Path>) -> Vec<String> {
  let mut args: Vec<String> = request
    .entry_points
    .iter()
    .map(|p| p.to_string_lossy().to_string())
    .collect();

  args.push("--bundle".to_string());
  args.push(format!("--outfile={}", outfile.display()));
  args.push(format!("--platform={}", request.platform));
  args.push("--jsx=automatic".to_string());

  if let Some(format) = request.format {
    args.push(format!("--format={}", format.as_str()));
  }

  if !request.targets.is_empty() {
    args.push(format!("--target={}", request.targets.join(",")));
  }

  if request.minify {
    args.push("--minify".to_string());
  }

  if request.sourcemap {
    args.push("--sourcemap=external".to_string());
  }

  if let Some(path) = metafile {
    args.push(format!("--metafile={}", path.display()));
  }

  if let Some(banner) = &request.banner {
    args.push(format!("--banner:js={}", banner));
  }

  for module in &request.external {
    args.push(format!("--external:{}", module));
  }

  for (from, to) in &request.alias {
    args.push(format!("--alias:{}={}", from, to));
  }

  for (key, value) in &request.define {
    args.push(format!("--define:{}={}", key, value));
  }

  for plugin in &request.plugins {
    args.extend(plugin_loaders(*plugin).iter().map(|s| s.to_string()));
  }

  args
}

/// The esbuild CLI cannot host JavaScript plugins; each asset plugin maps to
/// the closest built-in loader.
fn plugin_loaders(plugin: AssetPlugin) -> &'static [&'static str] {
  match plugin {
    AssetPlugin::Graphql => &["--loader:.graphql=text", "--loader:.gql=text"],
    AssetPlugin::SvgComponent => &["--loader:.svg=text"],
    AssetPlugin::VanillaExtract => &[],
  }
}
