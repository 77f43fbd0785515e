use std::sync::Arc;
use std::time::Duration;

use cordbuild_lib::artifact::{BundleSpec, OutputPath, Platform};
use cordbuild_lib::config::Mode;
use cordbuild_lib::registry::TargetRegistry;
use cordbuild_lib::schedule::{RunOptions, ScheduleError};
use cordbuild_lib::target::{BundleTarget, Target};

use super::common::{Behavior, FakeBundler, TestWorkspace, eventually, scheduler};

const SETTLE: Duration = Duration::from_millis(300);
const TIMEOUT: Duration = Duration::from_secs(10);

fn watch_options(skip_initial_build: bool) -> RunOptions {
  RunOptions {
    watch: true,
    skip_initial_build,
    debounce: Duration::from_millis(50),
    ..Default::default()
  }
}

/// A node target bundling `entry` into `out`, watching `watch`.
fn node_target(ws: &TestWorkspace, entry: &str, out: &str, watch: &str) -> Target {
  let config = ws.config(Mode::Development);
  let spec = BundleSpec::new(entry, Platform::Node, OutputPath::Fixed(config.output_path(out)));
  Target::leaf(BundleTarget::new(spec).watches(watch))
}

#[tokio::test]
async fn one_shot_failure_fails_run_but_keeps_finished_artifacts() {
  let ws = TestWorkspace::new();
  let config = ws.config(Mode::Production);
  let registry = TargetRegistry::for_config(&config).unwrap();
  let server_out = ws.output(&config, "server/index.js");
  let bundler = Arc::new(FakeBundler::new().with("admin", Behavior::FailAfter(Duration::from_millis(500))));

  let err = scheduler(config, bundler.clone(), RunOptions::default())
    .run(&registry, &["server".to_string(), "admin".to_string()])
    .await
    .unwrap_err();

  assert!(matches!(err, ScheduleError::BuildFailed { ref target, .. } if target == "admin"));
  let js = std::fs::read_to_string(&server_out).unwrap();
  assert!(js.contains("server/src/server.ts"));
  assert!(js.contains("\"2.0.0\""));
  assert_eq!(bundler.calls_for("server.ts"), 1);
}

#[tokio::test]
async fn one_shot_builds_composite_external() {
  let ws = TestWorkspace::new();
  let config = ws.config(Mode::Production);
  let registry = TargetRegistry::for_config(&config).unwrap();
  let sdk_out = ws.output(&config, "external/sdk/v1/sdk.latest.js");
  let css_dir = ws.output(&config, "external/sdk/v1/css");
  let bundler = Arc::new(FakeBundler::new());

  scheduler(config, bundler, RunOptions::default())
    .run(&registry, &["external".to_string()])
    .await
    .unwrap();

  assert!(sdk_out.exists());
  let hashed: Vec<_> = std::fs::read_dir(&css_dir).unwrap().collect();
  assert_eq!(hashed.len(), 1);
}

#[tokio::test]
async fn watch_with_skip_initial_build_waits_for_change() {
  let ws = TestWorkspace::new();
  ws.write_file("foo/index.ts", "export {};");
  let target = node_target(&ws, "foo/index.ts", "foo/index.js", "foo/");
  let registry: TargetRegistry = vec![("foo".to_string(), target)].into_iter().collect();
  let bundler = Arc::new(FakeBundler::new());

  let sched = scheduler(ws.config(Mode::Development), bundler.clone(), watch_options(true));
  let run = tokio::spawn(async move { sched.run(&registry, &["foo".to_string()]).await });

  tokio::time::sleep(SETTLE).await;
  assert_eq!(bundler.calls_for("foo/index.ts"), 0);

  ws.write_file("foo/index.ts", "export const x = 1;");

  assert!(eventually(TIMEOUT, || bundler.calls_for("foo/index.ts") >= 1).await);
  tokio::time::sleep(SETTLE).await;
  assert_eq!(bundler.calls_for("foo/index.ts"), 1);
  assert!(!run.is_finished());

  run.abort();
}

#[tokio::test]
async fn watch_builds_once_at_startup() {
  let ws = TestWorkspace::new();
  ws.write_file("foo/index.ts", "export {};");
  let target = node_target(&ws, "foo/index.ts", "foo/index.js", "foo/");
  let registry: TargetRegistry = vec![("foo".to_string(), target)].into_iter().collect();
  let bundler = Arc::new(FakeBundler::new());

  let sched = scheduler(ws.config(Mode::Development), bundler.clone(), watch_options(false));
  let run = tokio::spawn(async move { sched.run(&registry, &["foo".to_string()]).await });

  assert!(eventually(TIMEOUT, || bundler.calls_for("foo/index.ts") == 1).await);
  tokio::time::sleep(SETTLE).await;
  assert_eq!(bundler.calls_for("foo/index.ts"), 1);

  run.abort();
}

#[tokio::test]
async fn watch_failure_in_one_target_does_not_affect_another() {
  let ws = TestWorkspace::new();
  ws.write_file("good/index.ts", "export {};");
  ws.write_file("bad/index.ts", "export {};");
  let registry: TargetRegistry = vec![
    ("good".to_string(), node_target(&ws, "good/index.ts", "good/index.js", "good/")),
    ("bad".to_string(), node_target(&ws, "bad/index.ts", "bad/index.js", "bad/")),
  ]
  .into_iter()
  .collect();
  let bundler = Arc::new(FakeBundler::new().with("bad/", Behavior::FailAfter(Duration::ZERO)));
  let config = ws.config(Mode::Development);
  let good_out = ws.output(&config, "good/index.js");

  let sched = scheduler(config, bundler.clone(), watch_options(false));
  let run = tokio::spawn(async move { sched.run(&registry, &["bad".to_string(), "good".to_string()]).await });

  assert!(eventually(TIMEOUT, || good_out.exists()).await);
  assert!(eventually(TIMEOUT, || bundler.calls_for("bad/index.ts") == 1).await);
  let first = std::fs::read_to_string(&good_out).unwrap();

  // Both targets change; the failing one keeps failing, the other rebuilds.
  tokio::time::sleep(SETTLE).await;
  ws.write_file("bad/index.ts", "export const broken = ;");
  ws.write_file("good/index.ts", "export const y = 2;");

  assert!(eventually(TIMEOUT, || std::fs::read_to_string(&good_out).unwrap() != first).await);
  assert!(eventually(TIMEOUT, || bundler.calls_for("bad/index.ts") >= 2).await);
  assert!(!run.is_finished());

  run.abort();
}
