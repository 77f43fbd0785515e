//! Filesystem helpers for artifact output and target cleanup.

use std::io;
use std::path::Path;

use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Remove a file. A missing file is not an error.
pub async fn unlink_if_exists(path: &Path) -> io::Result<()> {
  match fs::remove_file(path).await {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e),
  }
}

/// Remove a file, symlink or directory tree. A missing path is not an error.
pub async fn remove_path(path: &Path) -> io::Result<()> {
  let metadata = match fs::symlink_metadata(path).await {
    Ok(m) => m,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
    Err(e) => return Err(e),
  };

  debug!(path = %path.display(), "removing");

  let result = if metadata.is_dir() {
    fs::remove_dir_all(path).await
  } else {
    fs::remove_file(path).await
  };

  match result {
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    other => other,
  }
}

/// Create the parent directory of `path`, if it has one.
pub async fn ensure_parent(path: &Path) -> io::Result<()> {
  match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent).await,
    _ => Ok(()),
  }
}

/// Write `contents` to `path`, marking the file executable when requested.
pub async fn write_file(path: &Path, contents: &str, executable: bool) -> io::Result<()> {
  fs::write(path, contents).await?;

  #[cfg(unix)]
  if executable {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await?;
  }

  #[cfg(not(unix))]
  let _ = executable;

  Ok(())
}

/// Create a symlink at `link` pointing to `target`.
pub async fn symlink(target: &Path, link: &Path) -> io::Result<()> {
  #[cfg(unix)]
  {
    fs::symlink(target, link).await
  }
  #[cfg(windows)]
  {
    fs::symlink_file(target, link).await
  }
}

/// Copy a file or directory tree, like `cp -r from to`.
///
/// When `from` is a directory, `to` receives its contents.
pub async fn copy_recursive(from: &Path, to: &Path) -> io::Result<()> {
  let from = from.to_path_buf();
  let to = to.to_path_buf();

  tokio::task::spawn_blocking(move || copy_tree(&from, &to))
    .await
    .map_err(io::Error::other)?
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
  if from.is_file() {
    if let Some(parent) = to.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(from, to)?;
    return Ok(());
  }

  for entry in WalkDir::new(from).sort_by_file_name() {
    let entry = entry.map_err(io::Error::other)?;
    let rel = entry.path().strip_prefix(from).map_err(io::Error::other)?;
    let dest = to.join(rel);

    if entry.file_type().is_dir() {
      std::fs::create_dir_all(&dest)?;
    } else {
      std::fs::copy(entry.path(), &dest)?;
    }
  }

  Ok(())
}
