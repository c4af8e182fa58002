//! Core traits and types for the caching system.

use std::time::Duration;
use tokio::time::Instant;

/// Identifies one cacheable query.
///
/// Two keys with the same `cache_hash` share cache entries and in-flight
/// requests, so implementors must hash every parameter that changes the
/// response and nothing that doesn't.
pub trait QueryKey {
  /// Stable identifier for this resource + parameter set.
  fn cache_hash(&self) -> String;

  /// Human-readable label for logs.
  fn description(&self) -> String;

  /// How long a stored result may be served without refetching.
  fn stale_time(&self) -> Duration;
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was stored (if it came from the cache)
  pub cached_at: Option<Instant>,
}

impl<T> CacheResult<T> {
  /// Data from a request this caller started.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Data from a request another caller had already started.
  pub fn joined(data: T) -> Self {
    Self {
      data,
      source: CacheSource::InFlight,
      cached_at: None,
    }
  }

  /// Data served from the cache.
  pub fn from_cache(data: T, cached_at: Instant, is_stale: bool) -> Self {
    Self {
      data,
      source: if is_stale {
        CacheSource::CacheStale
      } else {
        CacheSource::CacheFresh
      },
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fetched by this caller
  Network,
  /// Shared result of a request that was already in flight
  InFlight,
  /// From cache, inside the staleness window
  CacheFresh,
  /// From cache, past the staleness window
  CacheStale,
}
