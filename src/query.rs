//! Async query abstraction for view-side data fetching.
//!
//! Inspired by TanStack Query, a `Query<T>` wraps a fetcher closure and
//! exposes `{data, is_loading, error}` to render code. Caching and request
//! deduplication live below it in [`crate::cache`]; a `Query` only tracks
//! what one view has asked for and what came back.
//!
//! # Example
//!
//! ```ignore
//! let client = cached_client.clone();
//! let mut query = Query::new(move || {
//!     let client = client.clone();
//!     async move { client.current_releases(&Default::default()).await }
//! });
//!
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

use crate::api::ApiError;

/// Where a query is in its fetch cycle.
#[derive(Debug, Clone)]
pub enum QueryStatus {
  /// Never started, or disabled
  Idle,
  /// A fetch is pending
  Loading,
  /// Last fetch succeeded
  Success,
  /// Last fetch failed
  Error(ApiError),
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<Arc<T>, ApiError>> + Send>>;
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// Async query with state management for one view.
///
/// Data from the last successful fetch stays available while a refetch is
/// loading and after a refetch fails.
pub struct Query<T> {
  status: QueryStatus,
  data: Option<Arc<T>>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<Arc<T>, ApiError>>>,
  enabled: bool,
}

impl<T: Send + Sync + 'static> Query<T> {
  /// Create a query around `fetcher`, called on every `fetch`/`refetch`.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Arc<T>, ApiError>> + Send + 'static,
  {
    Self {
      status: QueryStatus::Idle,
      data: None,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
      enabled: true,
    }
  }

  /// A disabled query never fetches and reports neither data nor loading.
  pub fn enabled(mut self, enabled: bool) -> Self {
    self.enabled = enabled;
    self
  }

  /// Seed with previously cached data, shown until the first fetch lands.
  pub fn with_initial_data(mut self, data: Option<Arc<T>>) -> Self {
    if self.enabled {
      self.data = data;
    }
    self
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  /// Most recent successful result, if any.
  pub fn data(&self) -> Option<&T> {
    self.data.as_deref()
  }

  pub fn is_loading(&self) -> bool {
    matches!(self.status, QueryStatus::Loading)
  }

  pub fn is_error(&self) -> bool {
    matches!(self.status, QueryStatus::Error(_))
  }

  #[cfg(test)]
  pub fn error(&self) -> Option<&ApiError> {
    match &self.status {
      QueryStatus::Error(e) => Some(e),
      _ => None,
    }
  }

  /// Start fetching unless already loading or disabled.
  pub fn fetch(&mut self) {
    if !self.enabled || self.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Fetch again even if a fetch is pending; the pending result is ignored.
  pub fn refetch(&mut self) {
    if !self.enabled {
      return;
    }
    // Dropping the receiver discards whatever the old task sends
    self.receiver = None;
    self.start_fetch();
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the state changed. Call this on each UI tick.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.data = Some(data);
        self.status = QueryStatus::Success;
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        warn!(%error, network = error.is_network(), "query failed");
        self.status = QueryStatus::Error(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Task ended without sending; it panicked
        self.status = QueryStatus::Error(ApiError::Aborted);
        self.receiver = None;
        true
      }
    }
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.status = QueryStatus::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      let result = future.await;
      // Receiver may have been dropped by a refetch
      let _ = tx.send(result);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("status", &self.status)
      .field("data", &self.data)
      .field("enabled", &self.enabled)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::time::Duration;

  fn server_error() -> ApiError {
    ApiError::Status {
      status: 500,
      status_text: "Internal Server Error".to_string(),
      detail: None,
    }
  }

  async fn settle<T: Send + Sync + 'static>(query: &mut Query<T>) {
    for _ in 0..100 {
      if query.poll() {
        return;
      }
      tokio::time::sleep(Duration::from_millis(1)).await;
    }
  }

  #[tokio::test]
  async fn test_query_success() {
    let mut query = Query::new(|| async { Ok(Arc::new(vec![1, 2, 3])) });
    assert!(matches!(query.status, QueryStatus::Idle));

    query.fetch();
    assert!(query.is_loading());
    assert!(query.data().is_none());

    settle(&mut query).await;
    assert!(matches!(query.status, QueryStatus::Success));
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn test_query_error() {
    let mut query: Query<i32> = Query::new(|| async { Err(server_error()) });

    query.fetch();
    settle(&mut query).await;

    assert!(query.is_error());
    assert_eq!(query.error().and_then(|e| e.status()), Some(500));
    assert!(query.data().is_none());
  }

  #[tokio::test]
  async fn test_failed_refetch_keeps_data() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_fetch = calls.clone();
    let mut query = Query::new(move || {
      let n = calls_fetch.fetch_add(1, Ordering::SeqCst);
      async move {
        if n == 0 {
          Ok(Arc::new("first"))
        } else {
          Err(server_error())
        }
      }
    });

    query.fetch();
    settle(&mut query).await;
    assert_eq!(query.data(), Some(&"first"));

    query.refetch();
    assert!(query.is_loading());
    assert_eq!(query.data(), Some(&"first"));

    settle(&mut query).await;
    assert!(query.is_error());
    assert_eq!(query.data(), Some(&"first"));
  }

  #[tokio::test]
  async fn test_disabled_query_never_fetches() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_fetch = calls.clone();
    let mut query = Query::new(move || {
      calls_fetch.fetch_add(1, Ordering::SeqCst);
      async { Ok(Arc::new(1)) }
    })
    .enabled(false)
    .with_initial_data(Some(Arc::new(7)));

    query.fetch();
    query.refetch();
    tokio::time::sleep(Duration::from_millis(5)).await;

    assert!(!query.poll());
    assert!(!query.is_loading());
    assert!(query.data().is_none());
    assert!(query.error().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_initial_data_visible_while_loading() {
    let mut query = Query::new(|| async { Ok(Arc::new(2)) }).with_initial_data(Some(Arc::new(1)));

    query.fetch();
    assert!(query.is_loading());
    assert_eq!(query.data(), Some(&1));

    settle(&mut query).await;
    assert_eq!(query.data(), Some(&2));
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_noop() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_fetch = calls.clone();
    let mut query = Query::new(move || {
      calls_fetch.fetch_add(1, Ordering::SeqCst);
      async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(Arc::new(42))
      }
    });

    query.fetch();
    query.fetch();
    assert!(query.is_loading());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_refetch_discards_pending() {
    let counter = Arc::new(AtomicU32::new(0));
    let counter_fetch = counter.clone();

    let mut query = Query::new(move || {
      let n = counter_fetch.fetch_add(1, Ordering::SeqCst);
      async move {
        // First call resolves last
        let delay = if n == 0 { 60 } else { 10 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(Arc::new(n))
      }
    });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(5)).await;
    query.refetch();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(query.poll());
    assert_eq!(query.data(), Some(&1));
  }
}
