//! Persisted page and filter preferences, one namespace per resource kind.

mod store;

pub use store::{KeyValueStore, SqliteStore};

#[cfg(test)]
pub use store::MemoryStore;

use std::sync::Arc;
use tracing::warn;

use crate::catalog::{FilterSet, ResourceKind};

/// Key holding the session token
pub const TOKEN_KEY: &str = "token";

/// Page and filter persistence for one resource kind.
///
/// Reads happen once, when a list controller is created. Writes are fire and
/// forget: a failing store is logged and otherwise ignored.
#[derive(Clone)]
pub struct Preferences {
  store: Arc<dyn KeyValueStore>,
  kind: ResourceKind,
}

impl Preferences {
  pub fn new(store: Arc<dyn KeyValueStore>, kind: ResourceKind) -> Self {
    Self { store, kind }
  }

  /// Stored page as written, not parsed
  pub fn get_page(&self) -> Option<String> {
    self.read(self.kind.page_storage_key())
  }

  pub fn set_page(&self, page: u32) {
    self.write(self.kind.page_storage_key(), &page.to_string());
  }

  /// Stored filters; unreadable JSON counts as absent
  pub fn get_filters(&self) -> Option<FilterSet> {
    let raw = self.read(self.kind.filters_storage_key())?;
    match serde_json::from_str(&raw) {
      Ok(filters) => Some(filters),
      Err(e) => {
        warn!(kind = %self.kind, "ignoring unreadable stored filters: {}", e);
        None
      }
    }
  }

  pub fn set_filters(&self, filters: &FilterSet) {
    match serde_json::to_string(filters) {
      Ok(json) => self.write(self.kind.filters_storage_key(), &json),
      Err(e) => warn!(kind = %self.kind, "failed to serialize filters: {}", e),
    }
  }

  fn read(&self, key: &str) -> Option<String> {
    self.store.get(key).unwrap_or_else(|e| {
      warn!(key, "failed to read preference: {}", e);
      None
    })
  }

  fn write(&self, key: &str, value: &str) {
    if let Err(e) = self.store.set(key, value) {
      warn!(key, "failed to persist preference: {}", e);
    }
  }
}

/// Remove the token and every kind's page and filters
pub fn clear_all(store: &dyn KeyValueStore) {
  let keys = std::iter::once(TOKEN_KEY).chain(
    ResourceKind::ALL
      .iter()
      .flat_map(|k| [k.page_storage_key(), k.filters_storage_key()]),
  );

  for key in keys {
    if let Err(e) = store.remove(key) {
      warn!(key, "failed to clear preference: {}", e);
    }
  }
}
