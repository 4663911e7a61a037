//! [`SqlitePort`] — the [`ContactPort`] over one borrowed connection.
//!
//! [`crate::SqliteStore`] hands it an open transaction, so every query and
//! mutation the resolver issues lands in the same unit of work.

use linkid_core::{
  contact::{Contact, ContactId, LinkPrecedence, NewContact},
  port::ContactPort,
};
use tracing::trace;

use crate::{
  Error, Result,
  encode::{CONTACT_COLUMNS, RawContact, encode_dt, now},
};

pub struct SqlitePort<'a> {
  conn: &'a rusqlite::Connection,
}

impl<'a> SqlitePort<'a> {
  pub fn new(conn: &'a rusqlite::Connection) -> Self { Self { conn } }

  fn select<P: rusqlite::Params>(&self, filter: &str, params: P) -> Result<Vec<Contact>> {
    let sql = format!(
      "SELECT {CONTACT_COLUMNS} FROM contacts WHERE {filter} ORDER BY created_at, id"
    );
    trace!(%sql, "contact query");

    let mut stmt = self.conn.prepare(&sql)?;
    let raws = stmt
      .query_map(params, RawContact::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }
}

impl ContactPort for SqlitePort<'_> {
  type Error = Error;

  fn find_by_email_or_phone(
    &mut self,
    email: Option<&str>,
    phone: Option<&str>,
  ) -> Result<Vec<Contact>> {
    let mut conds: Vec<&'static str> = vec![];
    let mut values: Vec<&str> = vec![];
    if let Some(e) = email {
      conds.push("email = ?");
      values.push(e);
    }
    if let Some(p) = phone {
      conds.push("phone_number = ?");
      values.push(p);
    }

    if conds.is_empty() {
      return Ok(Vec::new());
    }
    self.select(&conds.join(" OR "), rusqlite::params_from_iter(values))
  }

  fn find_by_ids(&mut self, ids: &[ContactId]) -> Result<Vec<Contact>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    self.select(
      &format!("id IN ({placeholders})"),
      rusqlite::params_from_iter(ids.iter().map(|id| id.0)),
    )
  }

  fn find_by_linked_id(&mut self, primary_id: ContactId) -> Result<Vec<Contact>> {
    self.select("linked_id = ?1", rusqlite::params![primary_id.0])
  }

  fn insert(&mut self, input: NewContact) -> Result<Contact> {
    let at = now();
    let at_str = encode_dt(at);

    self.conn.execute(
      "INSERT INTO contacts (
         email, phone_number, linked_id, link_precedence, created_at, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
      rusqlite::params![
        input.email,
        input.phone_number,
        input.linked_id.map(|id| id.0),
        input.link_precedence.as_str(),
        at_str,
      ],
    )?;

    Ok(Contact {
      id:              ContactId(self.conn.last_insert_rowid()),
      email:           input.email,
      phone_number:    input.phone_number,
      linked_id:       input.linked_id,
      link_precedence: input.link_precedence,
      created_at:      at,
      updated_at:      at,
    })
  }

  fn update_link(
    &mut self,
    id: ContactId,
    linked_id: Option<ContactId>,
    precedence: LinkPrecedence,
  ) -> Result<()> {
    let changed = self.conn.execute(
      "UPDATE contacts
         SET linked_id = ?1, link_precedence = ?2, updated_at = ?3
       WHERE id = ?4",
      rusqlite::params![
        linked_id.map(|l| l.0),
        precedence.as_str(),
        encode_dt(now()),
        id.0,
      ],
    )?;

    if changed == 0 {
      return Err(Error::ContactNotFound(id));
    }
    Ok(())
  }
}
