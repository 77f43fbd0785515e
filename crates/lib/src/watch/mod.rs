//! Watch mode.
//!
//! - [`state`]: the pure `Idle / Debouncing / Building / BuildingWithPendingChange` machine
//! - [`coordinator`]: one actor per target applying that machine to real events
//! - [`fs`]: `notify` watchers feeding file changes into a coordinator
//!
//! Watchers and coordinators live until the process exits.

pub mod coordinator;
pub mod fs;
pub mod state;

pub use coordinator::{BuildRunner, ChangeNotifier, WatchCoordinator, WatchHandle, WatchOptions};
pub use fs::{FileWatcher, WatchError, watch_paths};
pub use state::{WatchAction, WatchEvent, WatchState};
