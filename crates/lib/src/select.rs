//! Target selection.
//!
//! Resolves the operator's comma-separated target list against the registry.

use crate::consts::SCRIPTS_TARGET;
use crate::registry::TargetRegistry;

/// Result of resolving requested target names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
  /// Registered names to build, in request order.
  pub names: Vec<String>,
  /// Requested names that are not registered. Callers warn about these.
  pub unknown: Vec<String>,
}

/// Resolve `requested` against `registry`.
///
/// With no request (or only empty entries) every registered name is selected
/// except the scripts aggregate, whose members are already registered
/// individually. Duplicate names are selected once.
pub fn select_targets(requested: Option<&str>, registry: &TargetRegistry) -> Selection {
  let entries: Vec<&str> = requested
    .map(|r| r.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
    .unwrap_or_default();

  if entries.is_empty() {
    return Selection {
      names: registry
        .names()
        .filter(|n| *n != SCRIPTS_TARGET)
        .map(str::to_string)
        .collect(),
      unknown: Vec::new(),
    };
  }

  let mut selection = Selection::default();
  for entry in entries {
    if !registry.contains(entry) {
      if !selection.unknown.iter().any(|u| u == entry) {
        selection.unknown.push(entry.to_string());
      }
      continue;
    }
    if !selection.names.iter().any(|n| n == entry) {
      selection.names.push(entry.to_string());
    }
  }

  selection
}
