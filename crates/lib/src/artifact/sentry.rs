//! Sourcemap staging for error-reporting uploads.
//!
//! Bundles associated with a Sentry project get a per-project directory under
//! `<output>/sourcemaps` holding symlinks to the JS and its map, plus a shell
//! command that uploads them for the current release.

use std::path::{Path, PathBuf};

use crate::artifact::types::{ArtifactError, SentryTarget};
use crate::util::fs::{symlink, unlink_if_exists, write_file};
use crate::util::text::shell_escape;

/// Staging directory for one project's artifacts.
pub fn staging_dir(output_dir: &Path, sentry: &SentryTarget) -> PathBuf {
  let dir = output_dir.join("sourcemaps");
  match &sentry.project {
    Some(project) => dir.join(project),
    None => dir,
  }
}

/// Build the `sentry-cli` command line uploading `basename` and its map.
pub fn upload_command(org: &str, sentry: &SentryTarget, release: &str, basename: &str) -> String {
  let mut parts = vec![
    "sentry-cli".to_string(),
    "releases".to_string(),
    "--org".to_string(),
    org.to_string(),
  ];

  if let Some(project) = &sentry.project {
    parts.push("--project".to_string());
    parts.push(shell_escape(project));
  }

  parts.push("files".to_string());
  parts.push(release.to_string());
  parts.push("upload-sourcemaps".to_string());

  if let Some(prefix) = &sentry.prefix {
    parts.push("--url-prefix".to_string());
    parts.push(shell_escape(prefix));
  }

  parts.push(shell_escape(basename));
  parts.push(shell_escape(&format!("{}.map", basename)));

  format!("{}\n", parts.join(" "))
}

/// A prepared staging directory for one artifact.
pub struct Staging {
  dir: PathBuf,
  basename: String,
}

impl Staging {
  /// Create the directory, drop links left by a previous build, write the
  /// upload command when a release is known and link the JS output into it.
  pub async fn prepare(
    dir: PathBuf,
    outpath: &Path,
    upload: Option<String>,
  ) -> Result<Self, ArtifactError> {
    let basename = outpath
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .unwrap_or_default();

    let staging = Self { dir, basename };

    tokio::fs::create_dir_all(&staging.dir)
      .await
      .map_err(|source| write_error(&staging.dir, source))?;

    let js_link = staging.js_link();
    let map_link = staging.map_path();
    unlink_if_exists(&js_link)
      .await
      .map_err(|source| write_error(&js_link, source))?;
    unlink_if_exists(&map_link)
      .await
      .map_err(|source| write_error(&map_link, source))?;

    if let Some(command) = upload {
      let path = staging.dir.join(format!("{}.upload", staging.basename));
      write_file(&path, &command, false)
        .await
        .map_err(|source| write_error(&path, source))?;
    }

    symlink(&link_target(&staging.dir, outpath), &js_link)
      .await
      .map_err(|source| write_error(&js_link, source))?;

    Ok(staging)
  }

  /// Link a sourcemap that was written next to the JS output.
  pub async fn link_map(&self, map_path: &Path) -> Result<(), ArtifactError> {
    let link = self.map_path();
    symlink(&link_target(&self.dir, map_path), &link)
      .await
      .map_err(|source| write_error(&link, source))
  }

  /// Store a sourcemap that is not referenced from the public JS.
  pub async fn store_map(&self, map: &str) -> Result<(), ArtifactError> {
    let path = self.map_path();
    write_file(&path, map, false)
      .await
      .map_err(|source| write_error(&path, source))
  }

  fn js_link(&self) -> PathBuf {
    self.dir.join(&self.basename)
  }

  fn map_path(&self) -> PathBuf {
    self.dir.join(format!("{}.map", self.basename))
  }
}

/// Symlink contents for `path` as seen from `dir`; relative when the two share
/// a base, absolute otherwise.
fn link_target(dir: &Path, path: &Path) -> PathBuf {
  pathdiff::diff_paths(path, dir).unwrap_or_else(|| path.to_path_buf())
}

fn write_error(path: &Path, source: std::io::Error) -> ArtifactError {
  ArtifactError::Write {
    path: path.to_path_buf(),
    source,
  }
}
