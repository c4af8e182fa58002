//! Serde types matching the release radar API responses.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Entities
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
  pub id: u64,
  pub name: String,
  pub slug: String,
  #[serde(default)]
  pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MangaRelease {
  pub id: u64,
  pub title: String,
  #[serde(default)]
  pub series_name: Option<String>,
  #[serde(default)]
  pub volume_number: Option<String>,
  #[serde(default)]
  pub isbn_13: Option<String>,
  #[serde(default)]
  pub isbn_10: Option<String>,
  pub release_date: NaiveDate,
  pub publisher: Publisher,
  #[serde(default)]
  pub format: Option<String>,
  #[serde(default)]
  pub page_count: Option<u32>,
  #[serde(default, deserialize_with = "deserialize_price")]
  pub price_usd: Option<f64>,
  #[serde(default, deserialize_with = "deserialize_price")]
  pub price_gbp: Option<f64>,
  #[serde(default)]
  pub cover_image_url: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub demographic: Option<String>,
  // Label sets; the server's ordering carries no meaning
  #[serde(default, deserialize_with = "deserialize_labels")]
  pub genres: Vec<String>,
  #[serde(default, deserialize_with = "deserialize_labels")]
  pub regions: Vec<String>,
  #[serde(default, deserialize_with = "deserialize_labels")]
  pub authors: Vec<String>,
  #[serde(default, deserialize_with = "deserialize_labels")]
  pub illustrators: Vec<String>,
}

impl MangaRelease {
  /// Case-insensitive match on title, series name or publisher name.
  pub fn matches(&self, needle: &str) -> bool {
    if needle.is_empty() {
      return true;
    }
    let needle = needle.to_lowercase();
    self.title.to_lowercase().contains(&needle)
      || self
        .series_name
        .as_deref()
        .is_some_and(|s| s.to_lowercase().contains(&needle))
      || self.publisher.name.to_lowercase().contains(&needle)
  }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaginationMeta {
  pub total: u64,
  pub limit: u64,
  pub offset: u64,
  /// "YYYY-MM", only on current-month listings
  #[serde(default)]
  pub month: Option<String>,
  /// Echo of the search term, only on search results
  #[serde(default)]
  pub query: Option<String>,
}

/// Returned by the current and search endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseListResponse {
  pub data: Vec<MangaRelease>,
  pub meta: PaginationMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingMeta {
  pub total: u64,
  #[serde(default)]
  pub months_covered: Vec<String>,
}

/// Upcoming releases grouped by "YYYY-MM"; map order is chronological.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingReleasesResponse {
  pub data: BTreeMap<String, Vec<MangaRelease>>,
  pub meta: UpcomingMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublisherFilter {
  pub id: u64,
  pub name: String,
  pub slug: String,
  #[serde(default)]
  pub release_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilters {
  #[serde(default)]
  pub publishers: Vec<PublisherFilter>,
  #[serde(default)]
  pub regions: Vec<String>,
  #[serde(default)]
  pub formats: Vec<String>,
  #[serde(default)]
  pub demographics: Vec<String>,
  #[serde(default)]
  pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublisherListResponse {
  pub data: Vec<PublisherFilter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
  pub status: String,
  #[serde(default)]
  pub version: Option<String>,
}

/// Body of a FastAPI error response.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
  pub detail: serde_json::Value,
}

impl ErrorBody {
  pub fn message(&self) -> String {
    match &self.detail {
      serde_json::Value::String(s) => s.clone(),
      other => other.to_string(),
    }
  }
}

// ============================================================================
// Request options
// ============================================================================

/// Sort order accepted by the current-releases endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  #[default]
  Date,
  Title,
  Publisher,
}

impl fmt::Display for SortOrder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      SortOrder::Date => "date",
      SortOrder::Title => "title",
      SortOrder::Publisher => "publisher",
    };
    f.write_str(s)
  }
}

// ============================================================================
// Helpers
// ============================================================================

/// Prices arrive as JSON numbers or as decimal strings, or null.
fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Price {
    Number(f64),
    Text(String),
  }

  match Option::<Price>::deserialize(deserializer)? {
    None => Ok(None),
    Some(Price::Number(n)) => Ok(Some(n)),
    Some(Price::Text(s)) => s
      .trim()
      .parse::<f64>()
      .map(Some)
      .map_err(|_| serde::de::Error::custom(format!("invalid price '{}'", s))),
  }
}

/// Label lists may be null on older records.
fn deserialize_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}


#[cfg(test)]
mod tests {
  use super::fixtures::*;
  use super::*;
  use serde_json::json;

  #[test]
  fn test_release_decodes_full_record() {
    let release: MangaRelease =
      serde_json::from_value(release_json(7, "One Piece, Vol. 107", "2024-06-04")).unwrap();

    assert_eq!(release.id, 7);
    assert_eq!(release.release_date, NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
    assert_eq!(release.publisher.slug, "viz");
    assert_eq!(release.price_usd, Some(11.99));
    assert_eq!(release.price_gbp, None);
    assert_eq!(release.genres, vec!["Action", "Adventure"]);
    assert!(release.illustrators.is_empty());
  }

  #[test]
  fn test_release_decodes_minimal_record() {
    let value = json!({
      "id": 1,
      "title": "Chainsaw Man, Vol. 15",
      "release_date": "2024-07-09",
      "publisher": { "id": 1, "name": "VIZ Media", "slug": "viz" },
      "genres": null
    });
    let release: MangaRelease = serde_json::from_value(value).unwrap();
    assert_eq!(release.series_name, None);
    assert!(release.genres.is_empty());
    assert!(release.authors.is_empty());
    assert_eq!(release.publisher.country, None);
  }

  #[test]
  fn test_price_accepts_decimal_string() {
    let mut value = release_json(1, "Berserk", "2024-06-11");
    value["price_usd"] = json!("24.99");
    let release: MangaRelease = serde_json::from_value(value).unwrap();
    assert_eq!(release.price_usd, Some(24.99));
  }

  #[test]
  fn test_price_rejects_garbage() {
    let mut value = release_json(1, "Berserk", "2024-06-11");
    value["price_usd"] = json!("cheap");
    assert!(serde_json::from_value::<MangaRelease>(value).is_err());
  }

  #[test]
  fn test_release_date_must_be_calendar_date() {
    let value = release_json(1, "Berserk", "June 11th");
    assert!(serde_json::from_value::<MangaRelease>(value).is_err());
  }

  #[test]
  fn test_upcoming_months_sorted() {
    let value = json!({
      "data": {
        "2024-08": [release_json(2, "B", "2024-08-01")],
        "2024-06": [release_json(1, "A", "2024-06-01")]
      },
      "meta": { "total": 2, "months_covered": ["2024-08", "2024-06"] }
    });
    let upcoming: UpcomingReleasesResponse = serde_json::from_value(value).unwrap();
    let months: Vec<_> = upcoming.data.keys().cloned().collect();
    assert_eq!(months, vec!["2024-06", "2024-08"]);
  }

  #[test]
  fn test_list_meta_optional_fields() {
    let list: ReleaseListResponse = serde_json::from_value(release_list_json(2)).unwrap();
    assert_eq!(list.meta.month.as_deref(), Some("2024-06"));
    assert_eq!(list.meta.query, None);
    assert_eq!(list.data.len(), 2);
  }

  #[test]
  fn test_matches_title_series_publisher() {
    let release: MangaRelease =
      serde_json::from_value(release_json(1, "Vol. 107", "2024-06-04")).unwrap();
    assert!(release.matches(""));
    assert!(release.matches("vol"));
    assert!(release.matches("ONE PIECE"));
    assert!(release.matches("viz"));
    assert!(!release.matches("kodansha"));
  }

  #[test]
  fn test_error_body_message() {
    let body: ErrorBody = serde_json::from_str(r#"{"detail":"server error"}"#).unwrap();
    assert_eq!(body.message(), "server error");

    let body: ErrorBody = serde_json::from_str(r#"{"detail":[{"msg":"field required"}]}"#).unwrap();
    assert_eq!(body.message(), r#"[{"msg":"field required"}]"#);
  }

  #[test]
  fn test_sort_order_display() {
    assert_eq!(SortOrder::Date.to_string(), "date");
    assert_eq!(SortOrder::Title.to_string(), "title");
    assert_eq!(SortOrder::Publisher.to_string(), "publisher");
  }
}
