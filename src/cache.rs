//! Freshness-checked creature cache in front of the API gateway.
//!
//! Answers "is this entity already known and fresh?" before the gateway is
//! allowed to touch the network. Staleness only disqualifies an entry from
//! lookups; it is never deleted, a later fresh write simply overwrites it.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::api::types::CreatureRecord;
use crate::store::Store;

/// Cache layer over the persistent store.
pub struct CacheLayer {
  store: Arc<Store>,
  /// How long a cached creature stays eligible for cache hits.
  ttl: Duration,
}

impl CacheLayer {
  pub fn new(store: Arc<Store>, ttl: Duration) -> Self {
    Self { store, ttl }
  }

  fn is_fresh(&self, cached_at: DateTime<Utc>) -> bool {
    Utc::now() - cached_at < self.ttl
  }

  fn fresh_record(&self, id: u32) -> Option<CreatureRecord> {
    let entry = self.store.get_cached(id)?;
    self.is_fresh(entry.cached_at).then_some(entry.record)
  }

  /// Resolve a query against the cache.
  ///
  /// A numeric query is looked up by id directly. A name only resolves
  /// through the search history, the one structure that maps names to ids;
  /// this bounds lookup cost without a separate name index. None means the
  /// caller must fetch from the source.
  pub fn resolve(&self, query: &str) -> Option<CreatureRecord> {
    let query = query.trim();

    if let Ok(id) = query.parse::<u32>() {
      if let Some(record) = self.fresh_record(id) {
        return Some(record);
      }
    }

    let id = self
      .store
      .history()
      .iter()
      .find(|e| e.name.eq_ignore_ascii_case(query))
      .map(|e| e.id)?;

    self.fresh_record(id)
  }

  /// Write a record back, stamping a new timestamp. Always overwrites the
  /// slot regardless of previous freshness.
  pub fn store(&self, record: &CreatureRecord) {
    self.store.put_cached(record);
  }
}

impl Clone for CacheLayer {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      ttl: self.ttl,
    }
  }
}
