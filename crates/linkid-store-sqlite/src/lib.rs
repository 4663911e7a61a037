//! SQLite backend for linkid.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Each identify call runs the
//! resolver inside a single `IMMEDIATE` transaction.

mod encode;
mod port;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use port::SqlitePort;
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
