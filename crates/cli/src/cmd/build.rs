//! Implementation of the `cordbuild` command.
//!
//! Loads the workspace configuration, assembles the target registry, resolves
//! the requested targets and hands them to the scheduler.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::info;

use cordbuild_lib::artifact::{ArtifactBuilder, EsbuildBundler};
use cordbuild_lib::config::{BuildConfig, Mode};
use cordbuild_lib::registry::TargetRegistry;
use cordbuild_lib::schedule::{RunOptions, Scheduler};
use cordbuild_lib::select::select_targets;
use cordbuild_lib::util::text::format_duration;

use crate::output::{format_target, print_info, print_success, print_warning};

/// Options for one invocation.
#[derive(Debug, Clone)]
pub struct BuildArgs {
  pub target: Option<String>,
  pub mode: String,
  pub watch: bool,
  pub clean: bool,
  pub metafile: bool,
  pub skip_initial_build: bool,
  pub root: PathBuf,
  pub list: bool,
  pub debounce: Option<Duration>,
}

/// Execute the build command.
///
/// In one-shot mode returns once every selected target is built, or with the
/// first failure. In watch mode only returns on a setup error.
pub fn cmd_build(args: &BuildArgs) -> Result<()> {
  let mode: Mode = args.mode.parse()?;

  let config = BuildConfig::load(&args.root, mode, args.metafile)
    .with_context(|| format!("Failed to load build configuration from {}", args.root.display()))?;
  let registry = TargetRegistry::for_config(&config).context("Failed to discover targets")?;

  if args.list {
    for name in registry.names() {
      if let Some(target) = registry.get(name) {
        println!("{}", format_target(name, target));
      }
    }
    return Ok(());
  }

  let selection = select_targets(args.target.as_deref(), &registry);
  for name in &selection.unknown {
    print_warning(&format!("Unknown target '{}', skipping", name));
  }

  if selection.names.is_empty() {
    print_warning("No targets to build");
    return Ok(());
  }

  if args.skip_initial_build && !args.watch {
    print_warning("--skipInitialBuild has no effect without --watch");
  }

  let options = RunOptions {
    watch: args.watch,
    clean: args.clean,
    skip_initial_build: args.skip_initial_build,
    debounce: args.debounce.unwrap_or_else(|| config.settings.debounce()),
  };

  info!(mode = %mode, output = %config.output_dir.display(), "starting");

  let bundler = Arc::new(EsbuildBundler::new(config.esbuild_path()));
  let artifacts = Arc::new(ArtifactBuilder::new(bundler, Arc::new(config)));
  let scheduler = Scheduler::new(artifacts, options);

  if args.watch {
    print_info(&format!("Watching {} target(s)", selection.names.len()));
  }

  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;

  let start = Instant::now();
  rt.block_on(scheduler.run(&registry, &selection.names))
    .context("Build failed")?;

  print_success(&format!(
    "Built {} target(s) in {}",
    selection.names.len(),
    format_duration(start.elapsed())
  ));

  Ok(())
}
