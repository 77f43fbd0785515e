//! Artifact building.
//!
//! One [`ArtifactBuilder::build`] call performs exactly one bundler invocation
//! and persists what it returns:
//!
//! 1. Resolve compile-time constants (browser builds check their environment first)
//! 2. Run the [`Bundler`]
//! 3. Classify the returned files (JS, sourcemap, CSS)
//! 4. Resolve the output path, hashing the JS for content-addressed outputs
//! 5. Write JS, CSS, sourcemap, metafile and error-reporting staging

pub mod bundler;
pub mod esbuild;
mod sentry;
mod types;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{BuildConfig, BuildVersion};
use crate::consts::{
  BROWSER_TARGETS, NODE_TARGET, OPTIONAL_BROWSER_ENV, REQUIRED_BROWSER_ENV, SECRET_PLACEHOLDER, SENTRY_RELEASE_ENV,
};
use crate::util::fs::{ensure_parent, write_file};
use crate::util::hash::hash_str;

pub use bundler::Bundler;
pub use esbuild::EsbuildBundler;
pub use sentry::{staging_dir, upload_command};
pub use types::{
  Artifact, ArtifactError, AssetPlugin, BundleError, BundleOutput, BundleRequest, BundleSpec, DEFAULT_PLUGINS, Format,
  OutputFile, OutputPath, OutputPathFn, Platform, SentryTarget, SourcemapPolicy,
};

use sentry::Staging;

/// Builds artifacts for one process-wide configuration.
#[derive(Clone)]
pub struct ArtifactBuilder {
  bundler: Arc<dyn Bundler>,
  config: Arc<BuildConfig>,
}

impl ArtifactBuilder {
  pub fn new(bundler: Arc<dyn Bundler>, config: Arc<BuildConfig>) -> Self {
    Self { bundler, config }
  }

  pub fn config(&self) -> &BuildConfig {
    &self.config
  }

  /// Bundle `spec` and write the result.
  ///
  /// # Arguments
  ///
  /// * `spec` - What to bundle and where it goes
  /// * `version` - The version baked into this build
  ///
  /// # Errors
  ///
  /// Fails before the bundler runs if a browser environment field is missing
  /// or holds a secret placeholder. Fails afterwards if the bundler fails,
  /// returns no JavaScript, or any output cannot be written.
  pub async fn build(&self, spec: &BundleSpec, version: &BuildVersion) -> Result<Artifact, ArtifactError> {
    let request = self.request(spec, version)?;
    let policy = SourcemapPolicy::new(self.config.mode, spec.platform, spec.sentry.is_some());

    debug!(
      entry = ?spec.entry_points,
      platform = %spec.platform,
      sourcemap = request.sourcemap,
      "bundling"
    );

    let output = self.bundler.bundle(&request).await?;
    let classified = classify(output.files);

    let Some(js) = classified.js else {
      return Err(ArtifactError::NoJavaScript);
    };

    if let (Some(css), Some(css_path)) = (&classified.css, &spec.outfile_css) {
      write_output(css_path, css, false).await?;
    }

    let content_hash = hash_str(&js);
    let outpath = spec.outfile.resolve(&content_hash, &js);

    let mut artifact = Artifact {
      js,
      css: classified.css,
      sourcemap: classified.sourcemap,
      metafile: output.metafile,
      content_hash,
      outpath: outpath.clone(),
    };

    let Some(outpath) = outpath else {
      debug!("output path resolved to nothing, discarding bundle");
      return Ok(artifact);
    };

    ensure_parent(&outpath)
      .await
      .map_err(|source| ArtifactError::Write {
        path: outpath.clone(),
        source,
      })?;

    if let Some(map) = &artifact.sourcemap {
      let staging = match &spec.sentry {
        Some(sentry) => {
          let upload = self
            .config
            .env_var(SENTRY_RELEASE_ENV)
            .filter(|release| !release.is_empty())
            .map(|release| upload_command(&self.config.settings.sentry.org, sentry, release, &basename(&outpath)));
          Some(Staging::prepare(staging_dir(&self.config.output_dir, sentry), &outpath, upload).await?)
        }
        None => None,
      };

      if policy.link {
        artifact
          .js
          .push_str(&format!("\n//# sourceMappingURL={}.map\n", basename(&outpath)));

        let map_path = with_suffix(&outpath, ".map");
        write_output(&map_path, map, false).await?;

        if let Some(staging) = &staging {
          staging.link_map(&map_path).await?;
        }
      } else if let Some(staging) = &staging {
        staging.store_map(map).await?;
      }
    }

    let executable = artifact.js.starts_with("#!");
    write_output(&outpath, &artifact.js, executable).await?;

    if let Some(metafile) = &artifact.metafile {
      write_output(&with_suffix(&outpath, ".meta"), metafile, false).await?;
    }

    Ok(artifact)
  }

  /// Resolve the bundler request for a spec.
  ///
  /// # Errors
  ///
  /// Browser builds fail when a required environment field is undefined or
  /// any exposed field contains the secret placeholder.
  pub fn request(&self, spec: &BundleSpec, version: &BuildVersion) -> Result<BundleRequest, ArtifactError> {
    let config = &self.config;
    let policy = SourcemapPolicy::new(config.mode, spec.platform, spec.sentry.is_some());

    let mut define = BTreeMap::new();
    define.insert("BUILDCONSTANTS.version".to_string(), js_string(&version.0));
    define.insert("BUILDCONSTANTS.versionPath".to_string(), js_string(config.version_path()));
    define.insert(
      "BUILDCONSTANTS.deployment".to_string(),
      js_optional(spec.deployment.as_deref()),
    );
    let dsn = spec
      .sentry
      .as_ref()
      .and_then(|s| s.project.as_deref())
      .and_then(|project| config.sentry_dsn(project));
    define.insert("BUILDCONSTANTS.sentryDSN".to_string(), js_optional(dsn));

    let (format, targets, minify, external, alias) = match spec.platform {
      Platform::Browser => {
        define.insert("global".to_string(), "globalThis".to_string());
        define.insert("process.env.NODE_ENV".to_string(), js_string(config.mode.as_str()));
        define.extend(browser_env_defines(&config.env)?);

        (
          spec.format,
          BROWSER_TARGETS.iter().map(|t| t.to_string()).collect(),
          !config.mode.is_development(),
          Vec::new(),
          BTreeMap::from([("react".to_string(), "react".to_string())]),
        )
      }
      Platform::Node => {
        define.insert(
          "BUILDCONSTANTS.loggingProcessName".to_string(),
          js_optional(spec.logging_process_name.as_deref()),
        );

        (
          Some(spec.format.unwrap_or(Format::Esm)),
          vec![NODE_TARGET.to_string()],
          false,
          config.package.external_dependencies(),
          BTreeMap::new(),
        )
      }
    };

    define.extend(spec.define.clone());

    Ok(BundleRequest {
      entry_points: spec.entry_points.iter().map(|p| config.source_path(p)).collect(),
      platform: spec.platform,
      format,
      targets,
      minify,
      external,
      define,
      alias,
      plugins: DEFAULT_PLUGINS.to_vec(),
      banner: spec.banner.clone(),
      sourcemap: policy.produce,
      metafile: config.metafile,
      working_dir: config.root.clone(),
    })
  }
}

/// Check the browser-exposed environment and turn it into `process.env.*` defines.
fn browser_env_defines(env: &BTreeMap<String, String>) -> Result<BTreeMap<String, String>, ArtifactError> {
  let mut defines = BTreeMap::new();

  for key in REQUIRED_BROWSER_ENV {
    let value = env
      .get(*key)
      .ok_or_else(|| ArtifactError::MissingEnv(key.to_string()))?;
    if value.contains(SECRET_PLACEHOLDER) {
      return Err(ArtifactError::SecretPlaceholder(key.to_string()));
    }
    defines.insert(format!("process.env.{}", key), js_string(value));
  }

  for key in OPTIONAL_BROWSER_ENV {
    let value = env.get(*key);
    if value.is_some_and(|v| v.contains(SECRET_PLACEHOLDER)) {
      return Err(ArtifactError::SecretPlaceholder(key.to_string()));
    }
    defines.insert(format!("process.env.{}", key), js_optional(value.map(String::as_str)));
  }

  Ok(defines)
}

#[derive(Debug, Default)]
struct Classified {
  js: Option<String>,
  sourcemap: Option<String>,
  css: Option<String>,
}

/// Sort bundler output by its name relative to the virtual `output.js`.
fn classify(files: Vec<OutputFile>) -> Classified {
  let mut classified = Classified::default();

  for file in files {
    match file.name.as_str() {
      "output.js" => classified.js = Some(file.text),
      "output.js.map" => classified.sourcemap = Some(file.text),
      "output.css" => classified.css = Some(file.text),
      "output.js.css" | "output.css.map" => {}
      other => warn!(path = %other, "bundler returned output with unknown path"),
    }
  }

  classified
}

async fn write_output(path: &Path, contents: &str, executable: bool) -> Result<(), ArtifactError> {
  let to_error = |source| ArtifactError::Write {
    path: path.to_path_buf(),
    source,
  };

  ensure_parent(path).await.map_err(to_error)?;
  write_file(path, contents, executable).await.map_err(to_error)
}

fn basename(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_default()
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
  let mut s = path.as_os_str().to_os_string();
  s.push(suffix);
  PathBuf::from(s)
}

/// A JavaScript string literal.
fn js_string(value: &str) -> String {
  serde_json::Value::String(value.to_string()).to_string()
}

fn js_optional(value: Option<&str>) -> String {
  value.map(js_string).unwrap_or_else(|| "undefined".to_string())
}
