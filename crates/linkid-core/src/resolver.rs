//! [`Resolver`] — drives a [`ContactPort`] through one identify call.
//!
//! The sequence is read matches, load the touched clusters, [`plan`], apply
//! the plan, re-read the winning cluster. Decisions live in
//! [`crate::plan`]; this module only moves data in and out of storage.

use tracing::{debug, error, info, warn};

use crate::{
  Error, Result,
  consolidated::ConsolidatedContact,
  contact::{Contact, ContactId, LinkPrecedence},
  observation::Observation,
  plan::{Cluster, Plan, Snapshot, plan},
  port::ContactPort,
};

/// Identity resolver over a storage port.
///
/// Holds no state between calls; every call recomputes from storage.
pub struct Resolver<P> {
  port: P,
}

impl<P: ContactPort> Resolver<P> {
  pub fn new(port: P) -> Self { Self { port } }

  /// Resolve `observation` into its consolidated cluster, creating,
  /// extending or merging clusters as needed.
  pub fn identify(&mut self, observation: &Observation) -> Result<ConsolidatedContact> {
    let matched = self
      .port
      .find_by_email_or_phone(observation.email(), observation.phone_number())
      .map_err(Error::storage)?;

    let snapshot = if matched.is_empty() {
      Snapshot::default()
    } else {
      let clusters = self.load_clusters(&matched)?;
      Snapshot { matched, clusters }
    };

    match plan(observation, &snapshot).inspect_err(|e| {
      if let Error::InternalInconsistency(msg) = e {
        error!(
          matched = ?snapshot.matched.iter().map(|c| c.id).collect::<Vec<_>>(),
          "{msg}"
        );
      }
    })? {
      Plan::Create(input) => {
        let created = self.port.insert(input).map_err(Error::storage)?;
        info!(primary_id = %created.id, "created new primary contact");
        Ok(ConsolidatedContact::from_cluster(&created, &[]))
      }
      Plan::Extend { primary_id, updates, insert } => {
        for update in &updates {
          self
            .port
            .update_link(update.id, Some(update.linked_id), LinkPrecedence::Secondary)
            .map_err(Error::storage)?;
        }
        if !updates.is_empty() {
          info!(
            %primary_id,
            relinked = updates.len(),
            "merged clusters into oldest primary"
          );
        }

        if let Some(input) = insert {
          let created = self.port.insert(input).map_err(Error::storage)?;
          debug!(%primary_id, secondary_id = %created.id, "recorded new secondary contact");
        }

        self.consolidate(primary_id)
      }
    }
  }

  /// Load the full membership of every cluster the matched contacts touch.
  fn load_clusters(&mut self, matched: &[Contact]) -> Result<Vec<Cluster>> {
    let mut roots: Vec<Contact> = Vec::new();
    let mut missing: Vec<ContactId> = Vec::new();

    for contact in matched {
      if contact.is_primary() {
        if !roots.iter().any(|r| r.id == contact.id) {
          roots.push(contact.clone());
        }
      } else if let Some(linked_id) = contact.linked_id {
        if !missing.contains(&linked_id) {
          missing.push(linked_id);
        }
      } else {
        warn!(contact_id = %contact.id, "secondary contact without linked id");
      }
    }
    missing.retain(|id| !roots.iter().any(|r| r.id == *id));

    if !missing.is_empty() {
      let fetched = self.port.find_by_ids(&missing).map_err(Error::storage)?;
      for contact in fetched {
        if contact.is_primary() {
          roots.push(contact);
        } else {
          warn!(contact_id = %contact.id, "linked id names a secondary contact");
        }
      }
    }

    roots
      .into_iter()
      .map(|primary| {
        let secondaries = self
          .port
          .find_by_linked_id(primary.id)
          .map_err(Error::storage)?;
        Ok(Cluster { primary, secondaries })
      })
      .collect()
  }

  /// Re-read the cluster rooted at `primary_id` and flatten it.
  fn consolidate(&mut self, primary_id: ContactId) -> Result<ConsolidatedContact> {
    let primary = self
      .port
      .find_by_ids(&[primary_id])
      .map_err(Error::storage)?
      .into_iter()
      .next()
      .ok_or_else(|| {
        error!(%primary_id, "winning primary vanished during identify");
        Error::InternalInconsistency("primary contact not found".to_owned())
      })?;
    let members = self
      .port
      .find_by_linked_id(primary_id)
      .map_err(Error::storage)?;

    Ok(ConsolidatedContact::from_cluster(&primary, &members))
  }
}
