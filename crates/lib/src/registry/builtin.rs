//! The static target table: one entry per product surface.

use std::path::PathBuf;

use crate::artifact::{BundleSpec, OutputPath, Platform, SentryTarget};
use crate::config::BuildConfig;
use crate::target::{BundleTarget, Target};

const SDK_DIR: &str = "external/sdk/v1";

/// Built-in targets, resolved against the configured output directory.
pub fn builtin_targets(config: &BuildConfig) -> Vec<(String, Target)> {
  vec![
    ("server".to_string(), server(config)),
    ("asyncWorker".to_string(), async_worker(config)),
    ("admin".to_string(), admin(config)),
    ("console".to_string(), console(config)),
    ("docsClient".to_string(), docs_client(config)),
    ("docsServer".to_string(), docs_server(config)),
    ("repl".to_string(), repl(config)),
    ("external".to_string(), external(config)),
  ]
}

fn node(config: &BuildConfig, entry: &str, outfile: &str, process: &str) -> BundleSpec {
  let mut spec = BundleSpec::new(entry, Platform::Node, OutputPath::Fixed(config.output_path(outfile)));
  spec.logging_process_name = Some(process.to_string());
  spec
}

/// Browser app writing `app.js` and `app.css` into `dir`.
fn browser_app(config: &BuildConfig, entry: &str, dir: &str) -> BundleSpec {
  let out = PathBuf::from(dir);
  let mut spec = BundleSpec::new(entry, Platform::Browser, OutputPath::Fixed(config.output_path(out.join("app.js"))));
  spec.outfile_css = Some(config.output_path(out.join("app.css")));
  spec
}

fn server(config: &BuildConfig) -> Target {
  let mut spec = node(config, "server/src/server.ts", "server/index.js", "server");
  spec.sentry = Some(SentryTarget::project("server"));

  Target::leaf(
    BundleTarget::new(spec)
      .cleans("server/index.js")
      .cleans("server/index.js.map")
      .watches("server/src/")
      .watches("common/"),
  )
}

fn async_worker(config: &BuildConfig) -> Target {
  let spec = node(config, "server/src/asyncTier/index.ts", "asyncWorker/index.js", "asyncWorker");

  Target::leaf(
    BundleTarget::new(spec)
      .cleans("asyncWorker")
      .watches("server/src/")
      .watches("common/"),
  )
}

fn admin(config: &BuildConfig) -> Target {
  let spec = browser_app(config, "external/src/entrypoints/admin/index.tsx", "server/admin");

  Target::leaf(
    BundleTarget::new(spec)
      .cleans("server/admin")
      .watches("external/src/")
      .watches("common/"),
  )
}

fn console(config: &BuildConfig) -> Target {
  let mut spec = browser_app(config, "external/src/entrypoints/console/index.tsx", "server/console");
  spec.sentry = Some(SentryTarget::project("console"));

  Target::leaf(
    BundleTarget::new(spec)
      .cleans("server/console")
      .watches("external/src/")
      .watches("common/"),
  )
}

fn docs_client(config: &BuildConfig) -> Target {
  let mut spec = browser_app(config, "docs/client/index.tsx", "docs/static");
  spec.deployment = Some("docs".to_string());

  Target::leaf(
    BundleTarget::new(spec)
      .cleans("docs/static")
      .watches("docs/client/")
      .watches("docs/common/")
      .watches("external/src/")
      .watches("common/"),
  )
}

fn docs_server(config: &BuildConfig) -> Target {
  let mut spec = node(config, "docs/server/index.ts", "docs/server/index.js", "docs");
  spec.deployment = Some("docs".to_string());

  Target::leaf(
    BundleTarget::new(spec)
      .cleans("docs/server")
      .watches("docs/server/")
      .watches("docs/common/")
      .watches("common/"),
  )
}

fn repl(config: &BuildConfig) -> Target {
  let mut spec = node(config, "server/src/repl.ts", "repl/index.js", "repl");
  spec.banner = Some("#!/usr/bin/env node".to_string());

  Target::leaf(
    BundleTarget::new(spec)
      .cleans("repl")
      .watches("server/src/")
      .watches("common/"),
  )
}

/// The embeddable SDK: the script itself and its content-addressed stylesheet
/// loader, built concurrently.
fn external(config: &BuildConfig) -> Target {
  let sdk_dir = PathBuf::from(SDK_DIR);

  let mut sdk = BundleSpec::new(
    "external/src/entrypoints/sdk/index.ts",
    Platform::Browser,
    OutputPath::Fixed(config.output_path(sdk_dir.join("sdk.latest.js"))),
  );
  sdk.sentry = Some(SentryTarget::project("sdk").with_prefix("~/sdk/v1"));

  let css_dir = config.output_path(sdk_dir.join("css"));
  let mut css = BundleSpec::new(
    "external/src/entrypoints/sdk/css.ts",
    Platform::Browser,
    OutputPath::content_addressed(move |hash, _js| Some(css_dir.join(format!("{}.js", hash)))),
  );
  css.outfile_css = Some(config.output_path(sdk_dir.join("sdk.css")));

  Target::Composite(vec![
    Target::leaf(
      BundleTarget::new(sdk)
        .cleans(sdk_dir.join("sdk.latest.js"))
        .cleans(sdk_dir.join("sdk.latest.js.map"))
        .watches("external/src/")
        .watches("common/"),
    ),
    Target::leaf(
      BundleTarget::new(css)
        .cleans(sdk_dir.join("css"))
        .cleans(sdk_dir.join("sdk.css"))
        .watches("external/src/")
        .watches("common/"),
    ),
  ])
}
