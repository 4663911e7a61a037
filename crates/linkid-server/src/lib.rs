//! HTTP server assembly for linkid.
//!
//! Loads [`ServerConfig`] and wraps [`linkid_api::api_router`] with request
//! tracing and CORS. The binary in `main.rs` owns process startup.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use linkid_core::store::ContactStore;
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration.
///
/// Sources, lowest precedence first: built-in defaults, the optional TOML
/// file, a bare `PORT` environment variable, then `LINKID_*` environment
/// variables (e.g. `LINKID_PORT=8080`).
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite database file; a leading `~/` is expanded.
  pub store_path: PathBuf,
}

impl ServerConfig {
  pub fn load(file: &Path) -> Result<Self, config::ConfigError> {
    Self::load_with_env(file, std::env::vars().collect())
  }

  fn load_with_env(
    file: &Path,
    env: config::Map<String, String>,
  ) -> Result<Self, config::ConfigError> {
    let bare_port: config::Map<String, String> = env
      .iter()
      .filter(|(k, _)| k.as_str() == "PORT")
      .map(|(k, v)| (k.clone(), v.clone()))
      .collect();

    config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 3000)?
      .set_default("store_path", "linkid.sqlite3")?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::default().source(Some(bare_port)))
      .add_source(config::Environment::with_prefix("LINKID").source(Some(env)))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: API routes plus HTTP tracing and permissive CORS.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: ContactStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  linkid_api::api_router(store)
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
}
