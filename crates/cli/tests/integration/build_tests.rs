#![cfg(unix)]

use predicates::prelude::*;

use cordbuild_lib::consts::REQUIRED_BROWSER_ENV;

use super::common::TestEnv;

#[test]
fn builds_selected_target() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["--target", "server", "--mode", "production"])
    .assert()
    .success()
    .stderr(predicate::str::contains("Built 1 target(s)"));

  let js = std::fs::read_to_string(env.output("server/index.js")).unwrap();
  assert!(js.contains("server/src/server.ts"));
}

#[test]
fn unknown_target_is_skipped_and_rest_built() {
  let env = TestEnv::new();

  env
    .cmd()
    .args(["--target", "server,bar"])
    .assert()
    .success()
    .stderr(predicate::str::contains("Unknown target 'bar'"));

  assert!(env.output("server/index.js").exists());
}

#[test]
fn failed_build_exits_with_one() {
  let env = TestEnv::new();
  let mut cmd = env.cmd();
  for key in REQUIRED_BROWSER_ENV {
    cmd.env(key, "test");
  }

  cmd
    .args(["--target", "server,admin", "--mode", "production"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("admin"))
    .stderr(predicate::str::contains("Could not resolve"));

  assert!(env.output("server/index.js").exists());
}

#[test]
fn browser_build_without_env_fails() {
  let env = TestEnv::new();
  let mut cmd = env.cmd();
  for key in REQUIRED_BROWSER_ENV {
    cmd.env_remove(key);
  }

  cmd
    .args(["--target", "console"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("must be defined in the process environment"));

  assert!(!env.output("server/console/app.js").exists());
}

#[test]
fn clean_removes_previous_output() {
  let env = TestEnv::new();
  env.write_file("dist/repl/stale.js", "old");

  env.cmd().args(["--target", "repl", "--clean"]).assert().success();

  assert!(!env.output("repl/stale.js").exists());
  assert!(env.output("repl/index.js").exists());
}

#[test]
fn scripts_aggregate_builds_discovered_scripts() {
  let env = TestEnv::new();
  env.write_file("scripts/seed.ts", "");
  env.write_file("scripts/ci/deploy.ts", "");

  env.cmd().args(["--target", "scripts"]).assert().success();

  assert!(env.output("scripts/seed.cjs").exists());
  assert!(env.output("scripts/ci/deploy.cjs").exists());
}
