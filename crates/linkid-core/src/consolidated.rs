//! The consolidated read model returned by identify.

use serde::{Deserialize, Serialize};

use crate::contact::{Contact, ContactId};

/// One identity cluster flattened into distinct emails and phone numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedContact {
  /// Wire name is fixed by the public interface, typo included.
  #[serde(rename = "primaryContatctId")]
  pub primary_contact_id:    ContactId,
  /// Primary's email first, then the rest in encounter order.
  pub emails:                Vec<String>,
  /// Primary's phone first, then the rest in encounter order.
  pub phone_numbers:         Vec<String>,
  pub secondary_contact_ids: Vec<ContactId>,
}

impl ConsolidatedContact {
  /// Build the view for `primary` and the members linked to it.
  ///
  /// `members` is taken in storage order; an entry equal to the primary is
  /// skipped.
  pub fn from_cluster(primary: &Contact, members: &[Contact]) -> Self {
    let mut emails = Vec::new();
    let mut phone_numbers = Vec::new();
    let mut secondary_contact_ids = Vec::new();

    push_distinct(&mut emails, primary.email.as_deref());
    push_distinct(&mut phone_numbers, primary.phone_number.as_deref());

    for member in members.iter().filter(|m| m.id != primary.id) {
      push_distinct(&mut emails, member.email.as_deref());
      push_distinct(&mut phone_numbers, member.phone_number.as_deref());
      secondary_contact_ids.push(member.id);
    }

    Self {
      primary_contact_id: primary.id,
      emails,
      phone_numbers,
      secondary_contact_ids,
    }
  }
}

fn push_distinct(values: &mut Vec<String>, value: Option<&str>) {
  if let Some(v) = value
    && !values.iter().any(|existing| existing == v)
  {
    values.push(v.to_owned());
  }
}
