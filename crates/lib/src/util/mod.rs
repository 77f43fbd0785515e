//! Shared utilities.
//!
//! Content hashing, filesystem helpers and small text formatters used across the crate.

pub mod fs;
pub mod hash;
pub mod text;
