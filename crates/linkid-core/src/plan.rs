//! Merge planning — the pure half of identity resolution.
//!
//! [`plan`] looks at a [`Snapshot`] of every cluster an observation touches
//! and returns the storage mutations needed to restore the invariants:
//! one primary per cluster, oldest wins, no secondary points at another
//! secondary. Nothing here performs I/O.

use crate::{
  Error, Result,
  contact::{Contact, ContactId, NewContact},
  observation::Observation,
};

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// A primary and every contact linked to it.
#[derive(Debug, Clone)]
pub struct Cluster {
  pub primary:     Contact,
  pub secondaries: Vec<Contact>,
}

/// Everything the planner needs to know about the current state.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  /// Contacts whose email or phone equals the observation's.
  pub matched:  Vec<Contact>,
  /// The clusters the matched contacts belong to.
  pub clusters: Vec<Cluster>,
}

// ─── Outputs ─────────────────────────────────────────────────────────────────

/// Relink `id` as a secondary of `linked_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkUpdate {
  pub id:        ContactId,
  pub linked_id: ContactId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
  /// Nothing matched: start a new cluster.
  Create(NewContact),
  /// Fold every touched cluster into `primary_id`, then optionally record
  /// the observation as a new secondary.
  Extend {
    primary_id: ContactId,
    updates:    Vec<LinkUpdate>,
    insert:     Option<NewContact>,
  },
}

// ─── Planner ─────────────────────────────────────────────────────────────────

pub fn plan(observation: &Observation, snapshot: &Snapshot) -> Result<Plan> {
  if snapshot.matched.is_empty() {
    return Ok(Plan::Create(NewContact::primary(
      observation.email().map(str::to_owned),
      observation.phone_number().map(str::to_owned),
    )));
  }

  let mut clusters: Vec<&Cluster> = snapshot.clusters.iter().collect();
  clusters.sort_by_key(|c| c.primary.age_key());
  clusters.dedup_by_key(|c| c.primary.id);

  let (winner, losers) = clusters
    .split_first()
    .ok_or_else(|| Error::InternalInconsistency("primary contact not found".to_owned()))?;
  let primary_id = winner.primary.id;

  let mut updates = Vec::new();
  for loser in losers {
    updates.push(LinkUpdate { id: loser.primary.id, linked_id: primary_id });
    updates.extend(
      loser
        .secondaries
        .iter()
        .map(|s| LinkUpdate { id: s.id, linked_id: primary_id }),
    );
  }

  let insert = has_new_info(observation, &snapshot.matched).then(|| {
    NewContact::secondary(
      observation.email().map(str::to_owned),
      observation.phone_number().map(str::to_owned),
      primary_id,
    )
  });

  Ok(Plan::Extend { primary_id, updates, insert })
}

/// True when the observation supplies an email or phone that none of the
/// matched contacts carries.
fn has_new_info(observation: &Observation, matched: &[Contact]) -> bool {
  let unseen_email = observation
    .email()
    .is_some_and(|e| !matched.iter().any(|c| c.email.as_deref() == Some(e)));
  let unseen_phone = observation
    .phone_number()
    .is_some_and(|p| !matched.iter().any(|c| c.phone_number.as_deref() == Some(p)));
  unseen_email || unseen_phone
}
