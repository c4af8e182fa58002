//! Named query parameters for API requests.

use std::fmt::Display;

/// Ordered list of query parameters where unset values are skipped.
///
/// Parameters keep the order they were pushed in so the generated query
/// string is predictable, but nothing downstream depends on that order:
/// cache keys go through [`QueryParams::canonical`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
  pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a parameter. `None` leaves the query string untouched.
  pub fn push<V: Display>(&mut self, name: &'static str, value: Option<V>) -> &mut Self {
    if let Some(value) = value {
      self.pairs.push((name, value.to_string()));
    }
    self
  }

  /// Builder form of [`push`](Self::push).
  pub fn with<V: Display>(mut self, name: &'static str, value: Option<V>) -> Self {
    self.push(name, value);
    self
  }

  pub fn is_empty(&self) -> bool {
    self.pairs.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
    self.pairs.iter().map(|(k, v)| (*k, v.as_str()))
  }

  #[cfg(test)]
  pub fn get(&self, name: &str) -> Option<&str> {
    self
      .pairs
      .iter()
      .find(|(k, _)| *k == name)
      .map(|(_, v)| v.as_str())
  }

  /// Order-independent representation used for cache keys.
  pub fn canonical(&self) -> String {
    let mut pairs: Vec<_> = self.pairs.iter().collect();
    pairs.sort();
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs {
      serializer.append_pair(k, v);
    }
    serializer.finish()
  }
}
