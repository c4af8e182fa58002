//! In-memory storage for query results.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// A stored query result.
#[derive(Debug, Clone)]
pub struct CachedEntry<T> {
  pub data: Arc<T>,
  /// When the result was stored
  pub cached_at: Instant,
}

impl<T> CachedEntry<T> {
  pub fn is_stale(&self, stale_time: Duration) -> bool {
    self.cached_at.elapsed() >= stale_time
  }
}

struct Slot {
  data: Arc<dyn Any + Send + Sync>,
  cached_at: Instant,
}

/// Query results keyed by cache hash and result type.
///
/// Results live for the lifetime of the process; nothing is evicted except
/// through [`remove_query`](Self::remove_query). Entries are replaced,
/// never mutated.
#[derive(Default)]
pub struct MemoryStorage {
  slots: HashMap<(String, TypeId), Slot>,
}

impl MemoryStorage {
  pub fn get<T: Any + Send + Sync>(&self, hash: &str) -> Option<CachedEntry<T>> {
    let slot = self.slots.get(&(hash.to_string(), TypeId::of::<T>()))?;
    let data = Arc::clone(&slot.data).downcast::<T>().ok()?;
    Some(CachedEntry {
      data,
      cached_at: slot.cached_at,
    })
  }

  pub fn store<T: Any + Send + Sync>(&mut self, hash: &str, data: Arc<T>) {
    self.slots.insert(
      (hash.to_string(), TypeId::of::<T>()),
      Slot {
        data,
        cached_at: Instant::now(),
      },
    );
  }

  /// Drop every result stored under `hash`. Returns how many were removed.
  pub fn remove_query(&mut self, hash: &str) -> usize {
    let before = self.slots.len();
    self.slots.retain(|(h, _), _| h != hash);
    before - self.slots.len()
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.slots.len()
  }
}
