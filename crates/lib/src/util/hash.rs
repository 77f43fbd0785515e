//! Content hashing for content-addressed output names.

use sha2::{Digest, Sha256};

/// A full 64-character SHA256 hash of build output.
///
/// Used to derive content-addressed file names, e.g. for CSS bundles served
/// from a CDN where the name must change whenever the content does.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string (64 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl ContentHash {
  /// Returns the first `len` characters, for short file names.
  pub fn prefix(&self, len: usize) -> &str {
    let len = len.min(self.0.len());
    &self.0[..len]
  }
}

/// Hash arbitrary bytes.
///
/// Returns the full 64-character SHA256 hash.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(format!("{:x}", hasher.finalize()))
}

/// Hash the UTF-8 bytes of a string.
pub fn hash_str(text: &str) -> ContentHash {
  hash_bytes(text.as_bytes())
}
