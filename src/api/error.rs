use std::sync::Arc;

/// Failure of a single API call.
///
/// Every variant is cheap to clone so a result shared between several
/// waiters on the same in-flight request can be handed to each of them.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
  /// The server answered with a non-success status.
  #[error("API request failed: {status} {status_text}{}", fmt_detail(.detail))]
  Status {
    status: u16,
    status_text: String,
    /// `detail` field of the error body, when the server sent one
    detail: Option<String>,
  },
  /// The request never completed (DNS, connect, timeout, broken body).
  #[error("Network error: {0}")]
  Network(Arc<reqwest::Error>),
  /// The body was not the shape the caller asked for.
  #[error("Failed to decode response from {path}: {source}")]
  Decode {
    path: String,
    #[source]
    source: Arc<serde_json::Error>,
  },
  /// Base URL and path did not form a valid URL.
  #[error("Invalid request URL {0}")]
  InvalidUrl(String),
  /// The task running the request ended without producing a result.
  #[error("Request aborted before completing")]
  Aborted,
}

fn fmt_detail(detail: &Option<String>) -> String {
  detail
    .as_deref()
    .map(|d| format!(" ({d})"))
    .unwrap_or_default()
}

impl ApiError {
  /// HTTP status code, if the server produced one.
  pub fn status(&self) -> Option<u16> {
    match self {
      ApiError::Status { status, .. } => Some(*status),
      _ => None,
    }
  }

  pub fn is_network(&self) -> bool {
    matches!(self, ApiError::Network(_))
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(error: reqwest::Error) -> Self {
    Self::Network(Arc::new(error))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_display_includes_detail() {
    let err = ApiError::Status {
      status: 500,
      status_text: "Internal Server Error".to_string(),
      detail: Some("server error".to_string()),
    };
    assert_eq!(
      err.to_string(),
      "API request failed: 500 Internal Server Error (server error)"
    );
    assert_eq!(err.status(), Some(500));
    assert!(!err.is_network());
  }

  #[test]
  fn test_status_display_without_detail() {
    let err = ApiError::Status {
      status: 404,
      status_text: "Not Found".to_string(),
      detail: None,
    };
    assert_eq!(err.to_string(), "API request failed: 404 Not Found");
  }

  #[test]
  fn test_invalid_url_has_no_status() {
    let err = ApiError::InvalidUrl("nope".to_string());
    assert_eq!(err.status(), None);
  }
}
