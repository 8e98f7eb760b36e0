//! In-memory result cache keyed by query.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::remote::Document;

/// A cached query result: the documents plus when they were fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry {
  pub docs: Vec<Document>,
  pub fetched_at: DateTime<Utc>,
}

/// In-process store mapping a cache key to its last fetched result.
///
/// One entry per key; a new result overwrites the old one. Entries are only
/// removed by [`CacheStore::invalidate`], so the store grows with the set of
/// distinct keys for the life of the process.
pub struct CacheStore {
  entries: RwLock<HashMap<String, CacheEntry>>,
  /// How long an entry counts as fresh after it was fetched.
  fresh_ttl: Duration,
}

impl CacheStore {
  /// Create a store with the default 5 minute freshness window.
  pub fn new() -> Self {
    Self {
      entries: RwLock::new(HashMap::new()),
      fresh_ttl: Duration::minutes(5),
    }
  }

  /// Override the freshness window.
  pub fn with_ttl(mut self, fresh_ttl: Duration) -> Self {
    self.fresh_ttl = fresh_ttl;
    self
  }

  /// Look up the entry for `key`. Pure read; absent keys return `None`.
  pub fn get(&self, key: &str) -> Option<CacheEntry> {
    self.entries.read().get(key).cloned()
  }

  /// Store `docs` under `key`, stamped with the current time. Replaces any
  /// previous entry for the key.
  pub fn set(&self, key: &str, docs: Vec<Document>) {
    self.set_at(key, docs, Utc::now());
  }

  /// Store `docs` under `key` with an explicit fetch timestamp.
  pub fn set_at(&self, key: &str, docs: Vec<Document>, fetched_at: DateTime<Utc>) {
    self
      .entries
      .write()
      .insert(key.to_string(), CacheEntry { docs, fetched_at });
  }

  /// Whether `entry` is still inside the freshness window. Entries outside
  /// it stay usable as a degraded fallback.
  pub fn is_fresh(&self, entry: &CacheEntry) -> bool {
    Utc::now() - entry.fetched_at < self.fresh_ttl
  }

  /// Drop the entry for `key`, if any. The next fetch for the key misses.
  pub fn invalidate(&self, key: &str) {
    self.entries.write().remove(key);
  }
}

impl Default for CacheStore {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::remote::testing::doc;
  use serde_json::json;

  #[test]
  fn set_then_get_round_trips() {
    let store = CacheStore::new();
    let docs = vec![doc("p1", json!({ "title": "Reel" }))];

    store.set("projects", docs.clone());

    let entry = store.get("projects").expect("entry");
    assert_eq!(entry.docs, docs);
  }

  #[test]
  fn get_misses_on_unknown_key() {
    let store = CacheStore::new();
    assert!(store.get("projects").is_none());
  }

  #[test]
  fn entry_is_fresh_after_set_and_stale_past_ttl() {
    let store = CacheStore::new();
    store.set("projects", vec![doc("p1", json!({}))]);
    assert!(store.is_fresh(&store.get("projects").unwrap()));

    // Back-date past the 5 minute window.
    store.set_at(
      "projects",
      vec![doc("p1", json!({}))],
      Utc::now() - Duration::seconds(600),
    );
    assert!(!store.is_fresh(&store.get("projects").unwrap()));
  }

  #[test]
  fn entry_aged_exactly_ttl_is_stale() {
    let store = CacheStore::new().with_ttl(Duration::seconds(60));
    store.set_at(
      "projects",
      vec![doc("p1", json!({}))],
      Utc::now() - Duration::seconds(60),
    );
    assert!(!store.is_fresh(&store.get("projects").unwrap()));
  }

  #[test]
  fn repeated_set_overwrites_value_and_advances_timestamp() {
    let store = CacheStore::new();
    let docs = vec![doc("p1", json!({ "title": "Reel" }))];

    let earlier = Utc::now() - Duration::seconds(30);
    store.set_at("projects", docs.clone(), earlier);
    store.set("projects", docs.clone());

    let entry = store.get("projects").unwrap();
    assert_eq!(entry.docs, docs);
    assert!(entry.fetched_at > earlier);
  }

  #[test]
  fn set_replaces_rather_than_appends() {
    let store = CacheStore::new();
    store.set("projects", vec![doc("p1", json!({}))]);
    store.set("projects", vec![doc("p2", json!({}))]);

    let entry = store.get("projects").unwrap();
    assert_eq!(entry.docs.len(), 1);
    assert_eq!(entry.docs[0].id, "p2");
  }

  #[test]
  fn invalidate_removes_the_entry() {
    let store = CacheStore::new();
    store.set("projects", vec![doc("p1", json!({}))]);

    store.invalidate("projects");
    assert!(store.get("projects").is_none());
  }
}
