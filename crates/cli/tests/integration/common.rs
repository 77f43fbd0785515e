//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Stand-in for esbuild: writes a one-line bundle naming the entry point to
/// `--outfile`. Entries containing `admin` fail after a second.
const FAKE_ESBUILD: &str = r#"#!/bin/sh
out=""
entry=""
for a in "$@"; do
  case "$a" in
    --outfile=*) out="${a#--outfile=}" ;;
    -*) ;;
    *) entry="$a" ;;
  esac
done
case "$entry" in
  *admin*) sleep 1; echo "Could not resolve \"./missing\" in $entry" >&2; exit 1 ;;
esac
echo "// $entry" > "$out"
"#;

/// Isolated workspace with a `package.json`, a fake bundler and a settings
/// file pointing at it.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let env = Self { temp };
    env.write_file("package.json", r#"{ "version": "3.1.4", "dependencies": { "pg": "^8" } }"#);
    env.write_file("cordbuild.toml", "esbuild = \"bin/esbuild\"\n");
    env.write_file("bin/esbuild", FAKE_ESBUILD);

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      std::fs::set_permissions(
        env.root().join("bin/esbuild"),
        std::fs::Permissions::from_mode(0o755),
      )
      .unwrap();
    }

    env
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  /// Write a file relative to the workspace root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.root().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Output path (the default `dist` directory).
  pub fn output(&self, relative_path: &str) -> PathBuf {
    self.root().join("dist").join(relative_path)
  }

  /// A cordbuild command rooted at this workspace.
  pub fn cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("cordbuild");
    cmd.env_remove("CORD_BUILD_OUTPUT");
    cmd.env_remove("SENTRY_RELEASE");
    cmd.arg("--root").arg(self.root());
    cmd
  }
}
