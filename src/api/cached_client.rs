//! Cached API client that wraps ApiClient with transparent caching.

use std::sync::Arc;
use tracing::debug;

use crate::cache::{CacheLayer, CacheResult};

use super::cache::ReleaseQueryKey;
use super::client::ApiClient;
use super::error::ApiError;
use super::requests::{CurrentReleasesParams, SearchParams, UpcomingReleasesParams};
use super::types::{
  HealthStatus, MetadataFilters, PublisherListResponse, ReleaseListResponse,
  UpcomingReleasesResponse,
};

/// API client with transparent caching support.
///
/// Exposes the same operations as [`ApiClient`], but results are cached
/// per query key and concurrent identical requests are collapsed into one.
/// Clones share both the connection pool and the cache.
#[derive(Clone)]
pub struct CachedClient {
  inner: ApiClient,
  cache: CacheLayer,
}

impl CachedClient {
  pub fn new(inner: ApiClient) -> Self {
    Self {
      inner,
      cache: CacheLayer::new(),
    }
  }

  pub fn base_url(&self) -> &str {
    self.inner.base_url()
  }

  /// Current-month releases, fresh for 5 minutes.
  pub async fn current_releases(
    &self,
    params: &CurrentReleasesParams,
  ) -> Result<Arc<ReleaseListResponse>, ApiError> {
    let query_key = ReleaseQueryKey::Current(params.clone());
    let inner = self.inner.clone();
    let params = params.clone();

    let result = self
      .cache
      .fetch(&query_key, move || async move {
        inner.current_releases(&params).await
      })
      .await?;

    Ok(served("current releases", result))
  }

  /// Upcoming releases by month, fresh for 30 minutes.
  pub async fn upcoming_releases(
    &self,
    params: &UpcomingReleasesParams,
  ) -> Result<Arc<UpcomingReleasesResponse>, ApiError> {
    let query_key = ReleaseQueryKey::Upcoming(params.clone());
    let inner = self.inner.clone();
    let params = params.clone();

    let result = self
      .cache
      .fetch(&query_key, move || async move {
        inner.upcoming_releases(&params).await
      })
      .await?;

    Ok(served("upcoming releases", result))
  }

  /// Search results, fresh for 5 minutes.
  ///
  /// An empty term is not a query: returns `None` without touching the
  /// network or the cache.
  pub async fn search_releases(
    &self,
    params: &SearchParams,
  ) -> Result<Option<Arc<ReleaseListResponse>>, ApiError> {
    if params.q.is_empty() {
      return Ok(None);
    }

    let query_key = ReleaseQueryKey::Search(params.clone());
    let inner = self.inner.clone();
    let params = params.clone();

    let result = self
      .cache
      .fetch(&query_key, move || async move {
        inner.search_releases(&params).await
      })
      .await?;

    Ok(Some(served("search", result)))
  }

  /// Publishers with release counts, fresh for an hour.
  pub async fn publishers(&self) -> Result<Arc<PublisherListResponse>, ApiError> {
    let inner = self.inner.clone();
    let result = self
      .cache
      .fetch(&ReleaseQueryKey::Publishers, move || async move {
        inner.publishers().await
      })
      .await?;

    Ok(served("publishers", result))
  }

  /// Filter facets, fresh for an hour.
  pub async fn metadata_filters(&self) -> Result<Arc<MetadataFilters>, ApiError> {
    let inner = self.inner.clone();
    let result = self
      .cache
      .fetch(&ReleaseQueryKey::MetadataFilters, move || async move {
        inner.metadata_filters().await
      })
      .await?;

    Ok(served("metadata filters", result))
  }

  /// Health probe (never served from cache).
  pub async fn health(&self) -> Result<Arc<HealthStatus>, ApiError> {
    let inner = self.inner.clone();
    let result = self
      .cache
      .fetch(&ReleaseQueryKey::Health, move || async move {
        inner.health().await
      })
      .await?;

    Ok(served("health", result))
  }

  /// Last stored result for `key`, even if stale.
  pub fn peek<T: Send + Sync + 'static>(&self, key: &ReleaseQueryKey) -> Option<Arc<T>> {
    self.cache.peek(key).map(|r| r.data)
  }

  /// Drop the stored result for `key` so the next call refetches.
  pub fn invalidate(&self, key: &ReleaseQueryKey) {
    self.cache.invalidate(key);
  }
}

fn served<T>(resource: &str, result: CacheResult<Arc<T>>) -> Arc<T> {
  debug!(
    resource,
    source = ?result.source,
    age = ?result.cached_at.map(|t| t.elapsed()),
    "served"
  );
  result.data
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::client::client_for;
  use crate::api::test_server::{unreachable_base_url, Reply, TestServer};
  use crate::api::types::fixtures::{release_json, release_list_json};
  use serde_json::json;
  use std::time::Duration;

  async fn serve_list() -> (TestServer, CachedClient) {
    let server = TestServer::start(|_| {
      Reply::json(200, release_list_json(2)).delayed(Duration::from_millis(50))
    })
    .await;
    let client = CachedClient::new(client_for(&server.base_url));
    (server, client)
  }

  fn viz_params() -> CurrentReleasesParams {
    CurrentReleasesParams {
      publisher: Some("viz".to_string()),
      limit: Some(20),
      ..Default::default()
    }
  }

  #[tokio::test]
  async fn test_concurrent_identical_requests_hit_server_once() {
    let (server, client) = serve_list().await;
    let params = viz_params();
    // An equal but separately built value shares the request too
    let same_params = viz_params();

    let (a, b, c) = tokio::join!(
      client.current_releases(&params),
      client.current_releases(&params),
      client.current_releases(&same_params),
    );

    assert_eq!(server.hits(), 1);
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&b, &c));
  }

  #[tokio::test]
  async fn test_sequential_requests_inside_window_reuse_cache() {
    let (server, client) = serve_list().await;

    client.current_releases(&viz_params()).await.unwrap();
    client.current_releases(&viz_params()).await.unwrap();
    assert_eq!(server.hits(), 1);

    // Different parameters are a different query
    client
      .current_releases(&CurrentReleasesParams::default())
      .await
      .unwrap();
    assert_eq!(server.hits(), 2);
  }

  #[tokio::test]
  async fn test_invalidate_refetches() {
    let (server, client) = serve_list().await;

    client.current_releases(&viz_params()).await.unwrap();
    client.invalidate(&ReleaseQueryKey::Current(viz_params()));
    client.current_releases(&viz_params()).await.unwrap();
    assert_eq!(server.hits(), 2);
  }

  #[tokio::test]
  async fn test_empty_search_never_reaches_server() {
    let (server, client) = serve_list().await;

    let result = client.search_releases(&SearchParams::new("")).await.unwrap();
    assert!(result.is_none());
    assert_eq!(server.hits(), 0);
  }

  #[tokio::test]
  async fn test_non_empty_search_issues_one_request() {
    let server = TestServer::start(|_| {
      Reply::json(
        200,
        json!({
          "data": [release_json(1, "Berserk Deluxe Edition", "2024-06-11")],
          "meta": { "total": 1, "limit": 50, "offset": 0, "query": "berserk" }
        }),
      )
    })
    .await;
    let client = CachedClient::new(client_for(&server.base_url));

    let result = client
      .search_releases(&SearchParams::new("berserk"))
      .await
      .unwrap()
      .unwrap();
    assert_eq!(result.meta.query.as_deref(), Some("berserk"));
    assert_eq!(server.hits(), 1);
    assert_eq!(
      server.target(0).as_deref(),
      Some("/api/v1/releases/search?q=berserk")
    );
  }

  #[tokio::test]
  async fn test_upcoming_response_and_peek() {
    let server = TestServer::start(|_| {
      let month: Vec<_> = (0..5)
        .map(|i| release_json(i, &format!("Release {}", i), "2024-06-18"))
        .collect();
      Reply::json(
        200,
        json!({ "data": { "2024-06": month }, "meta": { "total": 5, "months_covered": ["2024-06"] } }),
      )
    })
    .await;
    let client = CachedClient::new(client_for(&server.base_url));
    let params = UpcomingReleasesParams {
      months: Some(3),
      ..Default::default()
    };

    assert!(client
      .peek::<UpcomingReleasesResponse>(&ReleaseQueryKey::Upcoming(params.clone()))
      .is_none());

    let upcoming = client.upcoming_releases(&params).await.unwrap();
    assert_eq!(upcoming.data["2024-06"].len(), 5);

    let peeked = client
      .peek::<UpcomingReleasesResponse>(&ReleaseQueryKey::Upcoming(params))
      .unwrap();
    assert!(Arc::ptr_eq(&upcoming, &peeked));
  }

  #[tokio::test]
  async fn test_server_error_not_cached() {
    let server = TestServer::start(|_| Reply::json(500, json!({"detail": "server error"}))).await;
    let client = CachedClient::new(client_for(&server.base_url));

    let err = client.metadata_filters().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    let err = client.metadata_filters().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(server.hits(), 2);
  }

  #[tokio::test]
  async fn test_network_error_surfaces() {
    let client = CachedClient::new(client_for(&unreachable_base_url().await));
    let err = client.publishers().await.unwrap_err();
    assert!(err.is_network());
  }

  #[tokio::test]
  async fn test_health_not_cached() {
    let server = TestServer::start(|_| {
      Reply::json(200, json!({"status": "healthy", "version": "1.0.0"}))
    })
    .await;
    let client = CachedClient::new(client_for(&server.base_url));

    let health = client.health().await.unwrap();
    assert_eq!(health.version.as_deref(), Some("1.0.0"));
    client.health().await.unwrap();
    assert_eq!(server.hits(), 2);
  }
}
