//! Handler for `GET /contacts` — every stored row, verbatim. Diagnostic
//! only; not part of resolution.

use std::sync::Arc;

use axum::{Json, extract::State};
use linkid_core::{contact::Contact, store::ContactStore};

use crate::error::ApiError;

/// `GET /contacts`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Contact>>, ApiError>
where
  S: ContactStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let contacts = store
    .list_contacts()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(contacts))
}
