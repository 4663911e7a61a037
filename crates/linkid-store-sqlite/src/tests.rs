//! Integration tests for `SqliteStore` against an in-memory database.

use linkid_core::{
  contact::{Contact, ContactId, LinkPrecedence},
  observation::Observation,
  store::ContactStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn obs(email: Option<&str>, phone: Option<&str>) -> Observation {
  Observation::new(email.map(Into::into), phone.map(Into::into)).unwrap()
}

fn find(contacts: &[Contact], id: i64) -> &Contact {
  contacts.iter().find(|c| c.id == ContactId(id)).unwrap()
}

/// One primary per cluster, every secondary points straight at a primary.
fn assert_linkage_invariants(contacts: &[Contact]) {
  for c in contacts {
    match c.link_precedence {
      LinkPrecedence::Primary => assert!(c.linked_id.is_none()),
      LinkPrecedence::Secondary => {
        let target = c.linked_id.expect("secondary without linked id");
        assert!(find(contacts, target.0).is_primary(), "{} -> {target}", c.id);
      }
    }
  }
}

// ─── Identify ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_observation_creates_primary() {
  let s = store().await;

  let view = s.identify(obs(Some("a@x.com"), Some("111"))).await.unwrap();
  assert_eq!(view.emails, ["a@x.com"]);
  assert_eq!(view.phone_numbers, ["111"]);
  assert!(view.secondary_contact_ids.is_empty());

  let all = s.list_contacts().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].id, view.primary_contact_id);
  assert_eq!(all[0].link_precedence, LinkPrecedence::Primary);
  assert_eq!(all[0].created_at, all[0].updated_at);
}

#[tokio::test]
async fn new_phone_is_recorded_as_secondary() {
  let s = store().await;
  let first = s.identify(obs(Some("a@x.com"), Some("111"))).await.unwrap();

  let view = s.identify(obs(Some("a@x.com"), Some("222"))).await.unwrap();
  assert_eq!(view.primary_contact_id, first.primary_contact_id);
  assert_eq!(view.phone_numbers, ["111", "222"]);
  assert_eq!(view.secondary_contact_ids.len(), 1);

  let all = s.list_contacts().await.unwrap();
  let secondary = find(&all, view.secondary_contact_ids[0].0);
  assert_eq!(secondary.link_precedence, LinkPrecedence::Secondary);
  assert_eq!(secondary.linked_id, Some(first.primary_contact_id));
}

#[tokio::test]
async fn bridging_merges_into_older_primary() {
  let s = store().await;
  let older = s.identify(obs(Some("a@x.com"), Some("111"))).await.unwrap();
  let newer = s.identify(obs(Some("b@x.com"), Some("222"))).await.unwrap();
  s.identify(obs(Some("c@x.com"), Some("222"))).await.unwrap();

  let view = s.identify(obs(Some("a@x.com"), Some("222"))).await.unwrap();
  assert_eq!(view.primary_contact_id, older.primary_contact_id);
  assert_eq!(view.emails, ["a@x.com", "b@x.com", "c@x.com"]);
  assert_eq!(view.phone_numbers, ["111", "222"]);
  assert!(view.secondary_contact_ids.contains(&newer.primary_contact_id));

  let all = s.list_contacts().await.unwrap();
  assert_eq!(all.len(), 3, "bridging known values inserts nothing");
  let demoted = find(&all, newer.primary_contact_id.0);
  assert_eq!(demoted.link_precedence, LinkPrecedence::Secondary);
  assert_eq!(demoted.linked_id, Some(older.primary_contact_id));
  assert!(demoted.updated_at >= demoted.created_at);
  assert_linkage_invariants(&all);
}

#[tokio::test]
async fn exact_repeat_changes_nothing() {
  let s = store().await;
  s.identify(obs(Some("a@x.com"), Some("111"))).await.unwrap();
  s.identify(obs(Some("a@x.com"), Some("222"))).await.unwrap();
  let before = s.list_contacts().await.unwrap();

  let first = s.identify(obs(Some("a@x.com"), Some("222"))).await.unwrap();
  let second = s.identify(obs(None, Some("222"))).await.unwrap();

  assert_eq!(first, second);
  assert_eq!(s.list_contacts().await.unwrap(), before);
}

#[tokio::test]
async fn phone_only_observation_matches_by_phone() {
  let s = store().await;
  let first = s.identify(obs(Some("a@x.com"), Some("111"))).await.unwrap();

  let view = s.identify(obs(None, Some("111"))).await.unwrap();
  assert_eq!(view, first);
  assert_eq!(s.list_contacts().await.unwrap().len(), 1);
}

// ─── Failure handling ────────────────────────────────────────────────────────

#[tokio::test]
async fn broken_linkage_is_reported_and_nothing_is_written() {
  let s = store().await;
  // 1 <- 2 <- 3: a secondary pointing at another secondary.
  s.connection()
    .call(|conn| {
      conn.execute_batch(
        "INSERT INTO contacts (email, phone_number, linked_id, link_precedence, created_at, updated_at) VALUES
           ('a@x.com', '111', NULL, 'primary',   '2024-01-01T00:00:00.000000Z', '2024-01-01T00:00:00.000000Z'),
           ('b@x.com', '222', 1,    'secondary', '2024-01-01T00:00:01.000000Z', '2024-01-01T00:00:01.000000Z'),
           ('c@x.com', '333', 2,    'secondary', '2024-01-01T00:00:02.000000Z', '2024-01-01T00:00:02.000000Z');",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.identify(obs(Some("c@x.com"), Some("999"))).await.unwrap_err();
  assert!(
    matches!(err, crate::Error::Core(linkid_core::Error::InternalInconsistency(_))),
    "{err:?}"
  );
  assert_eq!(s.list_contacts().await.unwrap().len(), 3);
}

#[tokio::test]
async fn failure_after_a_write_rolls_back_the_whole_call() {
  let s = store().await;
  s.identify(obs(Some("a@x.com"), Some("111"))).await.unwrap();
  let loser = s.identify(obs(Some("b@x.com"), Some("222"))).await.unwrap();
  s.identify(obs(Some("c@x.com"), Some("222"))).await.unwrap();
  s.identify(obs(Some("d@x.com"), Some("222"))).await.unwrap();
  let before = s.list_contacts().await.unwrap();

  // The loser's primary is demoted first; relinking its secondaries aborts.
  s.connection()
    .call(|conn| {
      conn.execute_batch(
        "CREATE TRIGGER reject_secondary_relink BEFORE UPDATE ON contacts
           WHEN OLD.link_precedence = 'secondary'
           BEGIN SELECT RAISE(ABORT, 'relink rejected'); END;",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.identify(obs(Some("a@x.com"), Some("222"))).await.unwrap_err();
  assert!(
    matches!(err, crate::Error::Core(linkid_core::Error::Storage(_))),
    "{err:?}"
  );

  let after = s.list_contacts().await.unwrap();
  assert_eq!(after, before);
  assert!(find(&after, loser.primary_contact_id.0).is_primary());
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn interleaved_bridging_on_one_handle_keeps_a_single_primary() {
  let s = store().await;
  let a = s.identify(obs(Some("a@x.com"), Some("111"))).await.unwrap();
  s.identify(obs(Some("b@x.com"), Some("222"))).await.unwrap();
  s.identify(obs(Some("c@x.com"), Some("333"))).await.unwrap();

  let (s1, s2, s3) = (s.clone(), s.clone(), s.clone());
  let (r1, r2, r3) = tokio::join!(
    tokio::spawn(async move { s1.identify(obs(Some("a@x.com"), Some("222"))).await }),
    tokio::spawn(async move { s2.identify(obs(Some("b@x.com"), Some("333"))).await }),
    tokio::spawn(async move { s3.identify(obs(Some("c@x.com"), Some("111"))).await }),
  );
  for result in [r1, r2, r3] {
    result.unwrap().unwrap();
  }

  let all = s.list_contacts().await.unwrap();
  let primaries: Vec<_> = all.iter().filter(|c| c.is_primary()).collect();
  assert_eq!(primaries.len(), 1);
  assert_eq!(primaries[0].id, a.primary_contact_id);
  assert_eq!(all.len(), 3);
  assert_linkage_invariants(&all);

  let view = s.identify(obs(Some("b@x.com"), None)).await.unwrap();
  assert_eq!(view.primary_contact_id, a.primary_contact_id);
  assert_eq!(view.emails, ["a@x.com", "b@x.com", "c@x.com"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bridging_from_separate_connections_keeps_a_single_primary() {
  const CLUSTERS: usize = 8;

  let dir = std::env::temp_dir().join(format!("linkid-test-conc-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("shared.sqlite3");
  let _ = std::fs::remove_file(&path);

  let seed = SqliteStore::open(&path).await.unwrap();
  let mut oldest = None;
  for i in 0..CLUSTERS {
    let view = seed
      .identify(obs(Some(&format!("{i}@x.com")), Some(&format!("{i}00"))))
      .await
      .unwrap();
    oldest.get_or_insert(view.primary_contact_id);
  }

  // Each store owns its own SQLite connection, so the calls really race.
  let mut stores = Vec::new();
  for _ in 1..CLUSTERS {
    stores.push(SqliteStore::open(&path).await.unwrap());
  }
  let tasks: Vec<_> = stores
    .into_iter()
    .enumerate()
    .map(|(i, s)| {
      tokio::spawn(async move {
        s.identify(obs(Some(&format!("{i}@x.com")), Some(&format!("{}00", i + 1))))
          .await
      })
    })
    .collect();
  for task in tasks {
    task.await.unwrap().unwrap();
  }

  let all = seed.list_contacts().await.unwrap();
  let primaries: Vec<_> = all.iter().filter(|c| c.is_primary()).collect();
  assert_eq!(all.len(), CLUSTERS);
  assert_eq!(primaries.len(), 1);
  assert_eq!(Some(primaries[0].id), oldest);
  assert_linkage_invariants(&all);

  drop(seed);
  let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn store_survives_reopen() {
  let dir = std::env::temp_dir().join(format!("linkid-test-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("reopen.sqlite3");
  let _ = std::fs::remove_file(&path);

  let view = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.identify(obs(Some("a@x.com"), Some("111"))).await.unwrap()
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let again = s.identify(obs(Some("a@x.com"), None)).await.unwrap();
  assert_eq!(again, view);

  drop(s);
  let _ = std::fs::remove_dir_all(&dir);
}
