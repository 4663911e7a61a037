//! Error types for `linkid-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The caller supplied an observation that cannot be resolved.
  #[error("validation error: {0}")]
  Validation(String),

  /// Stored linkage violates the one-primary-per-cluster invariant.
  #[error("internal inconsistency: {0}")]
  InternalInconsistency(String),

  /// Propagated unchanged from the storage port.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
