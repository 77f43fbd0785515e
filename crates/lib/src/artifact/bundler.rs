//! The bundler seam.

use async_trait::async_trait;

use crate::artifact::types::{BundleError, BundleOutput, BundleRequest};

/// Something that turns entry points into bundled output files.
///
/// Implementations must not write to the final output location: they return
/// the files named relative to [`VIRTUAL_OUTFILE`](crate::consts::VIRTUAL_OUTFILE)
/// and the artifact builder decides where each one goes.
#[async_trait]
pub trait Bundler: Send + Sync {
  async fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput, BundleError>;
}
