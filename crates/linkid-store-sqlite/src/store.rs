//! [`SqliteStore`] — the SQLite implementation of [`ContactStore`].

use std::path::Path;

use linkid_core::{
  consolidated::ConsolidatedContact, contact::Contact, observation::Observation,
  resolver::Resolver, store::ContactStore,
};
use rusqlite::TransactionBehavior;
use tracing::debug;

use crate::{
  Result,
  encode::{CONTACT_COLUMNS, RawContact},
  port::SqlitePort,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A linkid contact store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  type Error = crate::Error;

  /// Runs the resolver inside one `BEGIN IMMEDIATE` transaction. The write
  /// lock is taken before the first read, so concurrent calls bridging the
  /// same clusters are serialized; any error rolls the whole call back.
  async fn identify(&self, observation: Observation) -> Result<ConsolidatedContact> {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let outcome = Resolver::new(SqlitePort::new(&tx)).identify(&observation);
        if outcome.is_ok() {
          tx.commit()?;
        }
        Ok(outcome)
      })
      .await?;

    let view = outcome?;
    debug!(
      primary_id = %view.primary_contact_id,
      secondaries = view.secondary_contact_ids.len(),
      "identify committed"
    );
    Ok(view)
  }

  async fn list_contacts(&self) -> Result<Vec<Contact>> {
    let raws: Vec<RawContact> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY id"))?;
        let rows = stmt
          .query_map([], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }
}
