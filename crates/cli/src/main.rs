mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cmd::BuildArgs;
use output::print_error;

/// Build and watch the Cord bundles
#[derive(Parser)]
#[command(name = "cordbuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Comma-separated target names (default: every target except the scripts aggregate)
  #[arg(long)]
  target: Option<String>,

  /// Build mode: development or production (development when omitted)
  #[arg(long, default_value = "development")]
  mode: String,

  /// Keep running and rebuild targets when their sources change
  #[arg(long)]
  watch: bool,

  /// Remove previous outputs before the first build
  #[arg(long)]
  clean: bool,

  /// Write a bundle analysis file next to each output
  #[arg(long)]
  metafile: bool,

  /// With --watch, wait for the first change instead of building at startup
  #[arg(long = "skipInitialBuild", alias = "skip-initial-build")]
  skip_initial_build: bool,

  /// Workspace root
  #[arg(long, default_value = ".")]
  root: PathBuf,

  /// Print the registered target names and exit
  #[arg(long)]
  list: bool,

  /// Settle window before a rebuild (e.g. 50ms)
  #[arg(long, value_parser = humantime::parse_duration)]
  debounce: Option<Duration>,

  /// Enable debug logging
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let args = BuildArgs {
    target: cli.target,
    mode: cli.mode,
    watch: cli.watch,
    clean: cli.clean,
    metafile: cli.metafile,
    skip_initial_build: cli.skip_initial_build,
    root: cli.root,
    list: cli.list,
    debounce: cli.debounce,
  };

  match cmd::cmd_build(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
