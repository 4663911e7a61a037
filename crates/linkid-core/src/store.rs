//! The `ContactStore` trait.
//!
//! Implemented by storage backends (e.g. `linkid-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  consolidated::ConsolidatedContact, contact::Contact, observation::Observation,
};

/// Async entry point to identity resolution over some backend.
///
/// A backend must make each `identify` call atomic: the reads, relinks and
/// insert of one call either all commit or none do, and concurrent calls
/// touching the same clusters are serialized.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ContactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve an observation into its consolidated cluster, applying any
  /// merges and inserts it requires.
  fn identify(
    &self,
    observation: Observation,
  ) -> impl Future<Output = Result<ConsolidatedContact, Self::Error>> + Send + '_;

  /// Every stored contact in ascending id order. Diagnostic only.
  fn list_contacts(
    &self,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;
}
