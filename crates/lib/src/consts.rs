//! Build-wide constants.

use std::time::Duration;

pub const APP_NAME: &str = "cordbuild";

/// Optional per-workspace settings file, resolved against the workspace root.
pub const SETTINGS_FILENAME: &str = "cordbuild.toml";

pub const PACKAGE_JSON: &str = "package.json";

/// Environment variable overriding the output root.
pub const OUTPUT_DIR_ENV: &str = "CORD_BUILD_OUTPUT";
pub const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Release identifier for sourcemap uploads.
pub const SENTRY_RELEASE_ENV: &str = "SENTRY_RELEASE";
pub const DEFAULT_SENTRY_ORG: &str = "cord";

pub const DEFAULT_ESBUILD: &str = "node_modules/.bin/esbuild";

/// Settle window between the first change of a burst and the rebuild.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Substring marking an unresolved secret in a generated environment.
pub const SECRET_PLACEHOLDER: &str = "!!SECRET!";

/// Environment fields exposed to browser bundles. Only add fields that are
/// safe to ship to end users; every entry here must be defined at build time.
pub const REQUIRED_BROWSER_ENV: &[&str] = &[
  "CORD_TIER",
  "JIRA_APP_CLIENT_ID",
  "ASANA_APP_CLIENT_ID",
  "LINEAR_APP_CLIENT_ID",
  "MONDAY_APP_CLIENT_ID",
  "TOP_SERVER_HOST",
  "APP_SERVER_HOST",
  "API_SERVER_HOST",
  "API_SERVER_HOST_PRODUCTION",
  "ADMIN_SERVER_HOST",
  "CONSOLE_SERVER_HOST",
  "MARKETING_SERVER_HOST",
  "DOCS_SERVER_HOST",
  "COMMUNITY_SERVER_HOST",
  "CORD_TO_HOST",
  "AUTH0_CUSTOM_LOGIN_DOMAIN",
  "AUTH0_CLIENT_ID",
  "DOCS_AI_CHATBOT_SERVER_HOST",
];

/// Browser-exposed environment fields that may be left undefined.
pub const OPTIONAL_BROWSER_ENV: &[&str] = &[
  "SENTRY_ENVIRONMENT",
  "SENTRY_RELEASE",
  "SENTRY_TRACE_SAMPLE_RATE",
  "INCLUDE_SDK_TESTBED",
  "SLACK_APP_REDIRECT_HOST",
];

/// Should match the supported browsers in the public documentation.
pub const BROWSER_TARGETS: &[&str] = &["es2019", "chrome90", "firefox88", "safari14.1", "edge90"];

pub const NODE_TARGET: &str = "node18";

pub const DEFAULT_SCRIPT_PATTERNS: &[&str] = &["scripts/*.ts", "scripts/ci/*.ts", "ops/aws/scripts/*.ts"];

/// Name of the synthetic aggregate holding every discovered script target.
pub const SCRIPTS_TARGET: &str = "scripts";

/// File name the bundler is told to produce; outputs are classified relative to it.
pub const VIRTUAL_OUTFILE: &str = "output.js";
