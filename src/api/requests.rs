//! Parameter sets for each API endpoint.

use chrono::NaiveDate;

use super::params::QueryParams;
use super::types::SortOrder;

pub const CURRENT_RELEASES_PATH: &str = "/api/v1/releases/current";
pub const UPCOMING_RELEASES_PATH: &str = "/api/v1/releases/upcoming";
pub const SEARCH_RELEASES_PATH: &str = "/api/v1/releases/search";
pub const PUBLISHERS_PATH: &str = "/api/v1/publishers";
pub const METADATA_FILTERS_PATH: &str = "/api/v1/metadata/filters";
pub const HEALTH_PATH: &str = "/health";

/// Filters for the current-month listing. Unset fields use server defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CurrentReleasesParams {
  pub limit: Option<u32>,
  pub offset: Option<u32>,
  /// Publisher slug
  pub publisher: Option<String>,
  /// Region code (us, uk, ...)
  pub region: Option<String>,
  pub format: Option<String>,
  pub sort: Option<SortOrder>,
}

impl CurrentReleasesParams {
  pub fn to_query(&self) -> QueryParams {
    QueryParams::new()
      .with("limit", self.limit)
      .with("offset", self.offset)
      .with("publisher", self.publisher.as_deref())
      .with("region", self.region.as_deref())
      .with("format", self.format.as_deref())
      .with("sort", self.sort)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UpcomingReleasesParams {
  /// Months ahead to include; the server accepts 1 to 4
  pub months: Option<u32>,
  pub publisher: Option<String>,
  pub region: Option<String>,
  pub format: Option<String>,
}

impl UpcomingReleasesParams {
  pub fn to_query(&self) -> QueryParams {
    QueryParams::new()
      .with("months", self.months)
      .with("publisher", self.publisher.as_deref())
      .with("region", self.region.as_deref())
      .with("format", self.format.as_deref())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchParams {
  /// Free-text term; always sent
  pub q: String,
  pub limit: Option<u32>,
  pub offset: Option<u32>,
  pub date_from: Option<NaiveDate>,
  pub date_to: Option<NaiveDate>,
}

impl SearchParams {
  pub fn new(q: impl Into<String>) -> Self {
    Self {
      q: q.into(),
      ..Self::default()
    }
  }

  pub fn to_query(&self) -> QueryParams {
    QueryParams::new()
      .with("q", Some(&self.q))
      .with("limit", self.limit)
      .with("offset", self.offset)
      .with("date_from", self.date_from)
      .with("date_to", self.date_to)
  }
}
