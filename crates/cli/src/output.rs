//! CLI output formatting utilities.
//!
//! Provides consistent formatting for one-line status messages and the
//! target listing.

use owo_colors::{OwoColorize, Stream};

use cordbuild_lib::target::Target;

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
}

/// One line of `--list` output: the name, plus the bundle count for groups.
pub fn format_target(name: &str, target: &Target) -> String {
  match target {
    Target::Leaf(_) => name.to_string(),
    Target::Composite(_) => format!("{} ({} bundles)", name, target.leaf_count()),
  }
}

pub fn print_success(message: &str) {
  eprintln!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stderr, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  eprintln!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stderr, |s| s.blue()),
    message
  );
}
