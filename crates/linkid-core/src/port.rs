//! The storage port consumed by [`crate::resolver::Resolver`].
//!
//! The port is synchronous on purpose: an implementation binds it to one
//! open database transaction, so that the whole read-decide-write sequence
//! of a single identify call is atomic. Async callers go through
//! [`crate::store::ContactStore`] instead.

use crate::contact::{Contact, ContactId, LinkPrecedence, NewContact};

/// Narrow persistence interface for identity resolution.
///
/// Every query returns contacts ordered by `(created_at, id)` ascending.
pub trait ContactPort {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Contacts whose email equals `email` or whose phone equals `phone`. A
  /// `None` argument drops its clause; both `None` yields no contacts.
  fn find_by_email_or_phone(
    &mut self,
    email: Option<&str>,
    phone: Option<&str>,
  ) -> Result<Vec<Contact>, Self::Error>;

  /// Contacts with the given ids. Unknown ids are skipped.
  fn find_by_ids(&mut self, ids: &[ContactId]) -> Result<Vec<Contact>, Self::Error>;

  /// Every contact whose `linked_id` is `primary_id`.
  fn find_by_linked_id(
    &mut self,
    primary_id: ContactId,
  ) -> Result<Vec<Contact>, Self::Error>;

  /// Persist `input` and return the stored row with its assigned id.
  fn insert(&mut self, input: NewContact) -> Result<Contact, Self::Error>;

  /// Rewrite a contact's link fields and bump its `updated_at`.
  fn update_link(
    &mut self,
    id: ContactId,
    linked_id: Option<ContactId>,
    precedence: LinkPrecedence,
  ) -> Result<(), Self::Error>;
}

impl<P: ContactPort + ?Sized> ContactPort for &mut P {
  type Error = P::Error;

  fn find_by_email_or_phone(
    &mut self,
    email: Option<&str>,
    phone: Option<&str>,
  ) -> Result<Vec<Contact>, Self::Error> {
    (**self).find_by_email_or_phone(email, phone)
  }

  fn find_by_ids(&mut self, ids: &[ContactId]) -> Result<Vec<Contact>, Self::Error> {
    (**self).find_by_ids(ids)
  }

  fn find_by_linked_id(
    &mut self,
    primary_id: ContactId,
  ) -> Result<Vec<Contact>, Self::Error> {
    (**self).find_by_linked_id(primary_id)
  }

  fn insert(&mut self, input: NewContact) -> Result<Contact, Self::Error> {
    (**self).insert(input)
  }

  fn update_link(
    &mut self,
    id: ContactId,
    linked_id: Option<ContactId>,
    precedence: LinkPrecedence,
  ) -> Result<(), Self::Error> {
    (**self).update_link(id, linked_id, precedence)
  }
}
