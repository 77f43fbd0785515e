//! Small text formatters.

use std::time::Duration;

/// Quote a value for a POSIX shell command line.
///
/// The value is wrapped in single quotes; embedded single quotes are closed,
/// escaped and reopened.
pub fn shell_escape(value: &str) -> String {
  format!("'{}'", value.replace('\'', "'\\''"))
}

/// Format an elapsed build time for log output.
pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}
