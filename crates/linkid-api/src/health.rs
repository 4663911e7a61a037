//! Liveness check and the JSON 404 fallback.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct Health {
  pub status:    &'static str,
  pub timestamp: DateTime<Utc>,
}

/// `GET /health`
pub async fn handler() -> Json<Health> {
  Json(Health { status: "OK", timestamp: Utc::now() })
}

pub async fn not_found() -> ApiError { ApiError::NotFound("not found".to_owned()) }
