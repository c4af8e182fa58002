use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;

use super::error::ApiError;
use super::params::QueryParams;
use super::requests::{
  CurrentReleasesParams, SearchParams, UpcomingReleasesParams, CURRENT_RELEASES_PATH,
  HEALTH_PATH, METADATA_FILTERS_PATH, PUBLISHERS_PATH, SEARCH_RELEASES_PATH,
  UPCOMING_RELEASES_PATH,
};
use super::types::{
  ErrorBody, HealthStatus, MetadataFilters, PublisherListResponse, ReleaseListResponse,
  UpcomingReleasesResponse,
};

/// Release radar API client.
///
/// Holds the base URL it was built with; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct ApiClient {
  http: reqwest::Client,
  base_url: Arc<str>,
}

impl ApiClient {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let base_url = config.base_url.trim().trim_end_matches('/');
    Url::parse(base_url).map_err(|e| eyre!("Invalid API base URL '{}': {}", base_url, e))?;

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url: Arc::from(base_url),
    })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Full URL for `path` with `params` appended as a query string.
  pub fn endpoint_url(&self, path: &str, params: &QueryParams) -> Result<Url, ApiError> {
    let raw = format!("{}{}", self.base_url, path);
    let mut url = Url::parse(&raw).map_err(|_| ApiError::InvalidUrl(raw.clone()))?;
    if !params.is_empty() {
      url.query_pairs_mut().extend_pairs(params.iter());
    }
    Ok(url)
  }

  /// GET `path` and decode the JSON body as `T`.
  pub async fn get<T: DeserializeOwned>(&self, path: &str, params: &QueryParams) -> Result<T, ApiError> {
    self.get_with_headers(path, params, HeaderMap::new()).await
  }

  /// Like [`get`](Self::get), with extra headers layered over the
  /// `Content-Type: application/json` default.
  pub async fn get_with_headers<T: DeserializeOwned>(
    &self,
    path: &str,
    params: &QueryParams,
    extra: HeaderMap,
  ) -> Result<T, ApiError> {
    let url = self.endpoint_url(path, params)?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in extra.iter() {
      headers.insert(name.clone(), value.clone());
    }

    debug!(%url, "GET");
    let response = self
      .http
      .get(url.clone())
      .headers(headers)
      .send()
      .await
      .map_err(|e| {
        warn!(%url, error = %e, "request failed");
        ApiError::from(e)
      })?;

    let status = response.status();
    if !status.is_success() {
      let detail = match response.bytes().await {
        Ok(body) => serde_json::from_slice::<ErrorBody>(&body)
          .ok()
          .map(|b| b.message()),
        Err(_) => None,
      };
      warn!(%url, status = status.as_u16(), ?detail, "request rejected");
      return Err(ApiError::Status {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        detail,
      });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| {
      warn!(%url, error = %e, "response did not match expected shape");
      ApiError::Decode {
        path: path.to_string(),
        source: Arc::new(e),
      }
    })
  }

  /// Releases in the current calendar month
  pub async fn current_releases(
    &self,
    params: &CurrentReleasesParams,
  ) -> Result<ReleaseListResponse, ApiError> {
    self.get(CURRENT_RELEASES_PATH, &params.to_query()).await
  }

  /// Releases in the coming months, grouped by month
  pub async fn upcoming_releases(
    &self,
    params: &UpcomingReleasesParams,
  ) -> Result<UpcomingReleasesResponse, ApiError> {
    self.get(UPCOMING_RELEASES_PATH, &params.to_query()).await
  }

  pub async fn search_releases(&self, params: &SearchParams) -> Result<ReleaseListResponse, ApiError> {
    self.get(SEARCH_RELEASES_PATH, &params.to_query()).await
  }

  /// All publishers with their release counts
  pub async fn publishers(&self) -> Result<PublisherListResponse, ApiError> {
    self.get(PUBLISHERS_PATH, &QueryParams::new()).await
  }

  pub async fn metadata_filters(&self) -> Result<MetadataFilters, ApiError> {
    self.get(METADATA_FILTERS_PATH, &QueryParams::new()).await
  }

  pub async fn health(&self) -> Result<HealthStatus, ApiError> {
    self.get(HEALTH_PATH, &QueryParams::new()).await
  }
}

#[cfg(test)]
pub(crate) fn client_for(base_url: &str) -> ApiClient {
  ApiClient::new(&ApiConfig {
    base_url: base_url.to_string(),
    timeout_secs: 5,
  })
  .unwrap()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::test_server::{unreachable_base_url, Reply, TestServer};
  use crate::api::types::fixtures::release_list_json;
  use reqwest::header::HeaderName;
  use serde_json::json;
  use std::collections::HashMap;

  fn query_map(url: &Url) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for (k, v) in url.query_pairs() {
      map.entry(k.into_owned()).or_default().push(v.into_owned());
    }
    map
  }

  #[test]
  fn test_new_rejects_bad_base_url() {
    let config = ApiConfig {
      base_url: "not a url".to_string(),
      timeout_secs: 5,
    };
    assert!(ApiClient::new(&config).is_err());
  }

  #[test]
  fn test_trailing_slash_trimmed() {
    let client = client_for("http://localhost:8000/");
    let url = client.endpoint_url(HEALTH_PATH, &QueryParams::new()).unwrap();
    assert_eq!(url.as_str(), "http://localhost:8000/health");
  }

  #[test]
  fn test_url_without_params_has_no_query() {
    let client = client_for("http://localhost:8000");
    let url = client
      .endpoint_url(CURRENT_RELEASES_PATH, &CurrentReleasesParams::default().to_query())
      .unwrap();
    assert_eq!(url.query(), None);
    assert_eq!(url.path(), "/api/v1/releases/current");
  }

  #[test]
  fn test_current_url_contains_each_param_once() {
    let client = client_for("http://localhost:8000");
    let params = CurrentReleasesParams {
      publisher: Some("viz".to_string()),
      limit: Some(20),
      ..Default::default()
    };
    let url = client
      .endpoint_url(CURRENT_RELEASES_PATH, &params.to_query())
      .unwrap();

    assert_eq!(url.path(), "/api/v1/releases/current");
    let query = query_map(&url);
    assert_eq!(query.len(), 2);
    assert_eq!(query["publisher"], vec!["viz"]);
    assert_eq!(query["limit"], vec!["20"]);
  }

  #[test]
  fn test_search_term_is_encoded() {
    let client = client_for("http://localhost:8000");
    let url = client
      .endpoint_url(SEARCH_RELEASES_PATH, &SearchParams::new("spy x family & co").to_query())
      .unwrap();
    assert!(!url.query().unwrap().contains(' '));
    assert_eq!(query_map(&url)["q"], vec!["spy x family & co"]);
  }

  #[tokio::test]
  async fn test_get_decodes_release_list() {
    let server = TestServer::start(|_| Reply::json(200, release_list_json(3))).await;
    let client = client_for(&server.base_url);

    let params = CurrentReleasesParams {
      publisher: Some("viz".to_string()),
      limit: Some(20),
      ..Default::default()
    };
    let list = client.current_releases(&params).await.unwrap();

    assert_eq!(list.data.len(), 3);
    assert_eq!(list.meta.total, 3);
    let target = server.target(0).unwrap();
    assert!(target.starts_with("/api/v1/releases/current?"));
    assert_eq!(target.matches("publisher=viz").count(), 1);
    assert_eq!(target.matches("limit=20").count(), 1);
  }

  #[tokio::test]
  async fn test_content_type_sent_and_extra_headers_merged() {
    let server = TestServer::start(|_| Reply::json(200, json!({"status": "healthy"}))).await;
    let client = client_for(&server.base_url);

    let mut extra = HeaderMap::new();
    extra.insert(
      HeaderName::from_static("x-request-source"),
      HeaderValue::from_static("tests"),
    );
    let health: HealthStatus = client
      .get_with_headers(HEALTH_PATH, &QueryParams::new(), extra)
      .await
      .unwrap();

    assert_eq!(health.status, "healthy");
    let head = server.requests()[0].to_lowercase();
    assert!(head.contains("content-type: application/json"));
    assert!(head.contains("x-request-source: tests"));
  }

  #[tokio::test]
  async fn test_server_error_is_status_error() {
    let server = TestServer::start(|_| Reply::json(500, json!({"detail": "server error"}))).await;
    let client = client_for(&server.base_url);

    let err = client.metadata_filters().await.unwrap_err();
    match err {
      ApiError::Status {
        status,
        status_text,
        detail,
      } => {
        assert_eq!(status, 500);
        assert_eq!(status_text, "Internal Server Error");
        assert_eq!(detail.as_deref(), Some("server error"));
      }
      other => panic!("expected status error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn test_client_error_with_plain_body() {
    let server = TestServer::start(|_| Reply::json(404, "not json")).await;
    let client = client_for(&server.base_url);

    let err = client.publishers().await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(!err.is_network());
  }

  #[tokio::test]
  async fn test_connection_refused_is_network_error() {
    let client = client_for(&unreachable_base_url().await);

    let err = client.health().await.unwrap_err();
    assert!(err.is_network());
    assert_eq!(err.status(), None);
  }

  #[tokio::test]
  async fn test_wrong_shape_is_decode_error() {
    let server = TestServer::start(|_| Reply::json(200, json!({"data": "nope"}))).await;
    let client = client_for(&server.base_url);

    let err = client
      .upcoming_releases(&UpcomingReleasesParams::default())
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::Decode { ref path, .. } if path == UPCOMING_RELEASES_PATH));
  }
}
