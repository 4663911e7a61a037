//! Error type for `linkid-store-sqlite`.

use linkid_core::contact::ContactId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] linkid_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// Raised inside a transaction, where calls bypass the async wrapper.
  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown link precedence: {0:?}")]
  UnknownPrecedence(String),

  #[error("contact not found: {0}")]
  ContactNotFound(ContactId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
