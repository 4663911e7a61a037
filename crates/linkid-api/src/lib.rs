//! JSON REST API for linkid.
//!
//! Exposes an axum [`Router`] backed by any
//! [`linkid_core::store::ContactStore`]. TLS, CORS and request tracing are
//! the caller's responsibility.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/identify` | Body: [`identify::IdentifyBody`] |
//! | `GET`  | `/contacts` | All stored contacts |
//! | `GET`  | `/health` | `{"status":"OK","timestamp":...}` |

pub mod contacts;
pub mod error;
pub mod health;
pub mod identify;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use linkid_core::store::ContactStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// Unknown paths answer `404 {"error":"not found"}`.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ContactStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/identify", post(identify::handler::<S>))
    .route("/contacts", get(contacts::list::<S>))
    .route("/health", get(health::handler))
    .fallback(health::not_found)
    .with_state(store)
}
