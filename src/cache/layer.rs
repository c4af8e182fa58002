//! Cache layer that orchestrates caching logic with network fetching.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::api::ApiError;

use super::storage::{CachedEntry, MemoryStorage};
use super::traits::{CacheResult, QueryKey};

type SharedFetch<T> = Shared<BoxFuture<'static, Result<Arc<T>, ApiError>>>;

#[derive(Default)]
struct State {
  storage: MemoryStorage,
  /// One pending request per (hash, type); values are `SharedFetch<T>`
  in_flight: HashMap<(String, TypeId), Box<dyn Any + Send + Sync>>,
}

/// Cache layer that manages caching logic and network fetching.
///
/// Sits between the API client and the views. A fresh stored result is
/// returned without a request; otherwise exactly one request per key runs
/// at a time and every concurrent caller for that key awaits the same
/// result. Failed requests leave stored results untouched.
#[derive(Clone, Default)]
pub struct CacheLayer {
  state: Arc<Mutex<State>>,
}

impl CacheLayer {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    // A panic while holding the lock cannot leave the maps half-written
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// Fetch with cache-first strategy.
  ///
  /// 1. Stored result inside the key's stale time: return it
  /// 2. Request already in flight for the key: await it
  /// 3. Otherwise call `fetcher`, store the result on success
  pub async fn fetch<K, T, F, Fut>(&self, key: &K, fetcher: F) -> Result<CacheResult<Arc<T>>, ApiError>
  where
    K: QueryKey,
    T: Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    let hash = key.cache_hash();
    let slot = (hash.clone(), TypeId::of::<T>());

    let (pending, joined) = {
      let mut state = Self::lock(&self.state);

      if let Some(cached) = state.storage.get::<T>(&hash) {
        if !cached.is_stale(key.stale_time()) {
          debug!(query = %key.description(), "cache hit");
          return Ok(CacheResult::from_cache(cached.data, cached.cached_at, false));
        }
      }

      let existing = state
        .in_flight
        .get(&slot)
        .and_then(|p| p.downcast_ref::<SharedFetch<T>>())
        .cloned();

      match existing {
        Some(pending) => {
          debug!(query = %key.description(), "joining in-flight request");
          (pending, true)
        }
        None => {
          debug!(query = %key.description(), "fetching");
          let pending = self.spawn_fetch(slot.clone(), fetcher());
          state.in_flight.insert(slot, Box::new(pending.clone()));
          (pending, false)
        }
      }
    };

    let data = pending.await?;
    Ok(if joined {
      CacheResult::joined(data)
    } else {
      CacheResult::from_network(data)
    })
  }

  /// Wrap `request` so that whoever drives it to completion also clears the
  /// in-flight slot and stores a successful result.
  fn spawn_fetch<T, Fut>(&self, slot: (String, TypeId), request: Fut) -> SharedFetch<T>
  where
    T: Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    let state = Arc::clone(&self.state);
    async move {
      let result = request.await.map(Arc::new);

      let mut state = Self::lock(&state);
      state.in_flight.remove(&slot);
      if let Ok(data) = &result {
        state.storage.store(&slot.0, Arc::clone(data));
      }
      result
    }
    .boxed()
    .shared()
  }

  /// Stored result for `key` regardless of staleness.
  pub fn peek<K, T>(&self, key: &K) -> Option<CacheResult<Arc<T>>>
  where
    K: QueryKey,
    T: Send + Sync + 'static,
  {
    let state = Self::lock(&self.state);
    let entry: CachedEntry<T> = state.storage.get(&key.cache_hash())?;
    let is_stale = entry.is_stale(key.stale_time());
    Some(CacheResult::from_cache(entry.data, entry.cached_at, is_stale))
  }

  /// Forget stored results for `key` so the next fetch goes to the network.
  /// A request already in flight is left alone.
  pub fn invalidate<K: QueryKey>(&self, key: &K) {
    let removed = Self::lock(&self.state).storage.remove_query(&key.cache_hash());
    debug!(query = %key.description(), removed, "invalidated");
  }

  /// Number of requests currently in flight.
  #[cfg(test)]
  pub fn in_flight(&self) -> usize {
    Self::lock(&self.state).in_flight.len()
  }
}
