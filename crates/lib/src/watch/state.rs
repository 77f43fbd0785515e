//! The per-target rebuild state machine.
//!
//! Pure and synchronous: the coordinator feeds it events and performs the
//! actions it returns. Holding the state in a single owner makes the
//! "is a build running? if not, start one" step atomic.

use std::fmt;

/// Where a target's watch loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WatchState {
  #[default]
  Idle,
  /// Waiting out the settle window that started with the first change of a burst.
  Debouncing,
  Building,
  /// Building, and at least one change arrived since the build started.
  BuildingWithPendingChange,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
  FileChanged,
  SettleElapsed,
  BuildFinished,
}

/// Side effects the coordinator must perform after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchAction {
  /// Start the settle timer; it reports back with [`WatchEvent::SettleElapsed`].
  ArmTimer,
  /// Start a build; it reports back with [`WatchEvent::BuildFinished`].
  StartBuild,
}

impl WatchState {
  /// The starting state, plus the build to run eagerly unless the first build
  /// should wait for a change.
  pub fn initial(skip_initial_build: bool) -> (Self, Option<WatchAction>) {
    if skip_initial_build {
      (WatchState::Idle, None)
    } else {
      (WatchState::Building, Some(WatchAction::StartBuild))
    }
  }

  /// Apply one event.
  ///
  /// Changes during the settle window do not restart the timer: the first
  /// change of a burst fixes when the build starts. Any number of changes
  /// during a build collapse into a single follow-up build, which starts as
  /// soon as the current one finishes.
  pub fn on_event(self, event: WatchEvent) -> (Self, Option<WatchAction>) {
    use WatchAction::*;
    use WatchEvent::*;
    use WatchState::*;

    match (self, event) {
      (Idle, FileChanged) => (Debouncing, Some(ArmTimer)),
      (Debouncing, FileChanged) => (Debouncing, None),
      (Debouncing, SettleElapsed) => (Building, Some(StartBuild)),
      (Building | BuildingWithPendingChange, FileChanged) => (BuildingWithPendingChange, None),
      (Building, BuildFinished) => (Idle, None),
      (BuildingWithPendingChange, BuildFinished) => (Building, Some(StartBuild)),
      (state, _) => (state, None),
    }
  }

  pub fn is_building(self) -> bool {
    matches!(self, WatchState::Building | WatchState::BuildingWithPendingChange)
  }
}

impl fmt::Display for WatchState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      WatchState::Idle => "idle",
      WatchState::Debouncing => "debouncing",
      WatchState::Building => "building",
      WatchState::BuildingWithPendingChange => "building (change pending)",
    };
    f.write_str(s)
  }
}
