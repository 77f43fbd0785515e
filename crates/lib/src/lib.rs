//! cordbuild-lib: Core types and logic for the Cord build orchestrator
//!
//! This crate turns named build targets into artifacts on disk:
//! - `Target`: a leaf build unit or an ordered composite of targets
//! - `TargetRegistry`: the static target table plus discovered script targets
//! - `ArtifactBuilder`: one bundler invocation and the files it writes
//! - `Scheduler`: concurrent clean/build of selected targets
//! - `WatchCoordinator`: debounced, serialized rebuilds per target

pub mod artifact;
pub mod config;
pub mod consts;
pub mod registry;
pub mod schedule;
pub mod select;
pub mod target;
pub mod util;
pub mod watch;
