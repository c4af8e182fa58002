//! Cache keys and staleness policy for release radar queries.

use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::cache::QueryKey;

use super::requests::{CurrentReleasesParams, SearchParams, UpcomingReleasesParams};

pub const CURRENT_STALE_TIME: Duration = Duration::from_secs(5 * 60);
pub const UPCOMING_STALE_TIME: Duration = Duration::from_secs(30 * 60);
pub const SEARCH_STALE_TIME: Duration = Duration::from_secs(5 * 60);
pub const METADATA_STALE_TIME: Duration = Duration::from_secs(60 * 60);
pub const PUBLISHERS_STALE_TIME: Duration = Duration::from_secs(60 * 60);

/// Query key types for release radar API calls.
#[derive(Clone, Debug)]
pub enum ReleaseQueryKey {
  Current(CurrentReleasesParams),
  Upcoming(UpcomingReleasesParams),
  Search(SearchParams),
  Publishers,
  MetadataFilters,
  Health,
}

impl ReleaseQueryKey {
  fn resource(&self) -> &'static str {
    match self {
      Self::Current(_) => "releases/current",
      Self::Upcoming(_) => "releases/upcoming",
      Self::Search(_) => "releases/search",
      Self::Publishers => "publishers",
      Self::MetadataFilters => "metadata/filters",
      Self::Health => "health",
    }
  }

  fn canonical_params(&self) -> String {
    match self {
      Self::Current(p) => p.to_query().canonical(),
      Self::Upcoming(p) => p.to_query().canonical(),
      Self::Search(p) => p.to_query().canonical(),
      Self::Publishers | Self::MetadataFilters | Self::Health => String::new(),
    }
  }
}

impl QueryKey for ReleaseQueryKey {
  fn cache_hash(&self) -> String {
    let input = format!("{}?{}", self.resource(), self.canonical_params());

    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }

  fn description(&self) -> String {
    let params = self.canonical_params();
    if params.is_empty() {
      self.resource().to_string()
    } else {
      format!("{} [{}]", self.resource(), params)
    }
  }

  fn stale_time(&self) -> Duration {
    match self {
      Self::Current(_) => CURRENT_STALE_TIME,
      Self::Upcoming(_) => UPCOMING_STALE_TIME,
      Self::Search(_) => SEARCH_STALE_TIME,
      Self::Publishers => PUBLISHERS_STALE_TIME,
      Self::MetadataFilters => METADATA_STALE_TIME,
      // Always revalidate; concurrent probes still share one request
      Self::Health => Duration::ZERO,
    }
  }
}
