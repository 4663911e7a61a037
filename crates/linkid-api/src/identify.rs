//! Handler for `POST /identify`.
//!
//! Body: `{"email"?: string, "phoneNumber"?: string | number}`; either may be
//! `null` or omitted, but not both. Returns `{"contact": ConsolidatedContact}`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use linkid_core::{
  consolidated::ConsolidatedContact, observation::Observation, store::ContactStore,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

/// JSON body accepted by `POST /identify`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyBody {
  #[serde(default)]
  pub email:        Option<String>,
  /// Clients often send phone numbers as JSON numbers; both forms are
  /// accepted and kept as their decimal text.
  #[serde(default, deserialize_with = "string_or_number")]
  pub phone_number: Option<String>,
}

impl TryFrom<IdentifyBody> for Observation {
  type Error = linkid_core::Error;

  fn try_from(body: IdentifyBody) -> Result<Self, Self::Error> {
    Observation::new(body.email, body.phone_number)
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdentifyResponse {
  pub contact: ConsolidatedContact,
}

/// `POST /identify`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<IdentifyBody>, JsonRejection>,
) -> Result<Json<IdentifyResponse>, ApiError>
where
  S: ContactStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let observation = Observation::try_from(body)?;

  let contact = store
    .identify(observation)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(IdentifyResponse { contact }))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Repr {
    Text(String),
    Number(serde_json::Number),
  }

  Ok(Option::<Repr>::deserialize(deserializer)?.map(|repr| match repr {
    Repr::Text(s) => s,
    Repr::Number(n) => n.to_string(),
  }))
}
