//! In-memory page store with lazy time-based expiry.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::catalog::PageResult;

/// Default lifetime of a cached page
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// A cached page and when it was stored
#[derive(Debug, Clone)]
pub struct CacheEntry {
  pub key: String,
  pub data: PageResult,
  pub stored_at: Instant,
}

impl CacheEntry {
  fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
    now.saturating_duration_since(self.stored_at) >= ttl
  }
}

/// Shared page cache.
///
/// One instance is created at startup and cloned into every list controller;
/// clones share the same map. Entries are only ever written after a
/// successful fetch and expire `ttl` after they were stored. Expired entries
/// are dropped by the lookup that finds them.
#[derive(Clone)]
pub struct TtlCache {
  entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
  ttl: Duration,
  max_entries: Option<usize>,
}

impl Default for TtlCache {
  fn default() -> Self {
    Self::new(DEFAULT_TTL)
  }
}

impl TtlCache {
  pub fn new(ttl: Duration) -> Self {
    Self {
      entries: Arc::new(Mutex::new(HashMap::new())),
      ttl,
      max_entries: None,
    }
  }

  /// Cap the number of stored pages. At capacity, inserting a new key evicts
  /// expired entries first and then the oldest one.
  pub fn with_max_entries(mut self, max_entries: usize) -> Self {
    self.max_entries = Some(max_entries.max(1));
    self
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
    // Entries are plain data; a panic mid-insert leaves nothing half-built
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Look up a live entry, evicting it if it has expired
  pub fn get(&self, key: &str) -> Option<CacheEntry> {
    let mut entries = self.lock();
    let now = Instant::now();

    match entries.get(key) {
      Some(entry) if entry.is_expired(now, self.ttl) => {
        entries.remove(key);
        debug!(key, "cache entry expired");
        None
      }
      Some(entry) => Some(entry.clone()),
      None => None,
    }
  }

  /// Store `data` under `key`, replacing any previous entry
  pub fn set(&self, key: impl Into<String>, data: PageResult) {
    let key = key.into();
    let mut entries = self.lock();
    let now = Instant::now();

    if let Some(max) = self.max_entries {
      if !entries.contains_key(&key) && entries.len() >= max {
        let ttl = self.ttl;
        entries.retain(|_, e| !e.is_expired(now, ttl));

        if entries.len() >= max {
          let oldest = entries
            .values()
            .min_by_key(|e| e.stored_at)
            .map(|e| e.key.clone());
          if let Some(oldest) = oldest {
            debug!(key = %oldest, "cache full, evicting oldest entry");
            entries.remove(&oldest);
          }
        }
      }
    }

    entries.insert(
      key.clone(),
      CacheEntry {
        key,
        data,
        stored_at: now,
      },
    );
  }

  /// Drop everything
  pub fn clear(&self) {
    self.lock().clear();
  }

  /// Number of live entries
  pub fn len(&self) -> usize {
    let now = Instant::now();
    self
      .lock()
      .values()
      .filter(|e| !e.is_expired(now, self.ttl))
      .count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl fmt::Debug for TtlCache {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TtlCache")
      .field("ttl", &self.ttl)
      .field("max_entries", &self.max_entries)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::{fixtures, Entity};

  fn page(name: &str) -> PageResult {
    fixtures::page(vec![fixtures::character(1, name)], 1)
  }

  fn first_name(entry: &CacheEntry) -> &str {
    match &entry.data.items[0] {
      Entity::Character(c) => &c.name,
      Entity::Location(l) => &l.name,
    }
  }

  fn stored(cache: &TtlCache) -> usize {
    cache.entries.lock().unwrap().len()
  }

  #[tokio::test(start_paused = true)]
  async fn test_get_returns_fresh_entry() {
    let cache = TtlCache::default();
    cache.set("characters_1", page("Rick"));

    tokio::time::advance(Duration::from_secs(299)).await;

    let entry = cache.get("characters_1").unwrap();
    assert_eq!(entry.key, "characters_1");
    assert_eq!(first_name(&entry), "Rick");
  }

  #[tokio::test(start_paused = true)]
  async fn test_expired_entry_is_evicted_on_lookup() {
    let cache = TtlCache::default();
    cache.set("characters_1", page("Rick"));

    tokio::time::advance(DEFAULT_TTL).await;

    // Not counted even before the lookup evicts it
    assert_eq!(cache.len(), 0);
    assert_eq!(stored(&cache), 1);

    assert!(cache.get("characters_1").is_none());
    assert_eq!(stored(&cache), 0);
  }

  #[tokio::test(start_paused = true)]
  async fn test_set_refreshes_timestamp() {
    let cache = TtlCache::default();
    cache.set("locations_1", page("Earth"));

    tokio::time::advance(Duration::from_secs(240)).await;
    cache.set("locations_1", page("Citadel"));
    tokio::time::advance(Duration::from_secs(120)).await;

    let entry = cache.get("locations_1").unwrap();
    assert_eq!(first_name(&entry), "Citadel");
  }

  #[test]
  fn test_missing_key_has_no_side_effect() {
    let cache = TtlCache::default();
    assert!(cache.get("nope").is_none());
    assert!(cache.is_empty());
  }

  #[test]
  fn test_clones_share_storage_and_clear() {
    let cache = TtlCache::default();
    let other = cache.clone();

    cache.set("characters_1", page("Rick"));
    other.set("locations_1", page("Earth"));
    assert_eq!(cache.len(), 2);
    assert!(other.get("characters_1").is_some());

    other.clear();
    assert!(cache.is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn test_capacity_evicts_oldest() {
    let cache = TtlCache::default().with_max_entries(2);
    cache.set("a", page("A"));
    tokio::time::advance(Duration::from_secs(1)).await;
    cache.set("b", page("B"));
    tokio::time::advance(Duration::from_secs(1)).await;
    cache.set("c", page("C"));

    assert!(cache.get("a").is_none());
    assert!(cache.get("b").is_some());
    assert!(cache.get("c").is_some());

    // Overwriting an existing key never evicts
    cache.set("c", page("C2"));
    assert_eq!(cache.len(), 2);
  }
}
