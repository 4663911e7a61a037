//! Contact records — the nodes of an identity cluster.
//!
//! A cluster is one `primary` contact plus every contact whose `linked_id`
//! names it. Contacts are never deleted; the only mutation is relinking a
//! contact to a different primary (demotion or chain flattening).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Storage-assigned identifier of a [`Contact`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContactId(pub i64);

impl fmt::Display for ContactId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

// ─── Precedence ──────────────────────────────────────────────────────────────

/// Whether a contact is the canonical record of its cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPrecedence {
  Primary,
  Secondary,
}

impl LinkPrecedence {
  /// The string stored in the `link_precedence` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Primary => "primary",
      Self::Secondary => "secondary",
    }
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A stored contact record.
///
/// `linked_id` is `Some` exactly when `link_precedence` is
/// [`LinkPrecedence::Secondary`], and then names a primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id:              ContactId,
  pub email:           Option<String>,
  pub phone_number:    Option<String>,
  pub linked_id:       Option<ContactId>,
  pub link_precedence: LinkPrecedence,
  /// Set by storage on insertion; never changes.
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl Contact {
  pub fn is_primary(&self) -> bool {
    self.link_precedence == LinkPrecedence::Primary
  }

  /// Sort key for oldest-wins decisions. The id breaks ties between
  /// contacts created within the same timestamp tick.
  pub fn age_key(&self) -> (DateTime<Utc>, ContactId) {
    (self.created_at, self.id)
  }
}

// ─── NewContact ──────────────────────────────────────────────────────────────

/// Input to [`crate::port::ContactPort::insert`]. The id and both
/// timestamps are assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
  pub email:           Option<String>,
  pub phone_number:    Option<String>,
  pub linked_id:       Option<ContactId>,
  pub link_precedence: LinkPrecedence,
}

impl NewContact {
  /// A new cluster root.
  pub fn primary(email: Option<String>, phone_number: Option<String>) -> Self {
    Self {
      email,
      phone_number,
      linked_id: None,
      link_precedence: LinkPrecedence::Primary,
    }
  }

  /// A new member of the cluster rooted at `primary_id`.
  pub fn secondary(
    email: Option<String>,
    phone_number: Option<String>,
    primary_id: ContactId,
  ) -> Self {
    Self {
      email,
      phone_number,
      linked_id: Some(primary_id),
      link_precedence: LinkPrecedence::Secondary,
    }
  }
}
