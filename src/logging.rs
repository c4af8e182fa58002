//! Tracing subscriber setup.
//!
//! The TUI owns stdout, so log output goes to a daily-rolling file under the
//! data directory (`~/.local/share/release-radar/` on Linux) instead.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

/// Environment variable holding a filter directive; wins over the config file.
pub const LOG_ENV: &str = "RELEASE_RADAR_LOG";

const LOG_FILE_PREFIX: &str = "release-radar.log";

/// Install the global subscriber.
///
/// Returns the appender guard, which must be held until exit so buffered
/// lines get flushed. Returns `None` when the log directory can't be
/// created; logging is optional and the app runs without it.
pub fn init(config: &LogConfig) -> Option<WorkerGuard> {
  let dir = log_dir(config)?;
  if std::fs::create_dir_all(&dir).is_err() {
    return None;
  }

  let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let subscriber = tracing_subscriber::registry()
    .with(filter(config))
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true),
    );

  // Already initialised (tests) is fine
  let _ = subscriber.try_init();
  Some(guard)
}

fn log_dir(config: &LogConfig) -> Option<PathBuf> {
  config
    .dir
    .clone()
    .or_else(|| dirs::data_dir().map(|d| d.join("release-radar")))
}

fn filter(config: &LogConfig) -> EnvFilter {
  let directive = std::env::var(LOG_ENV)
    .ok()
    .or_else(|| config.level.clone())
    .unwrap_or_else(|| "info".to_string());

  EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_explicit_dir_wins() {
    let config = LogConfig {
      level: None,
      dir: Some(PathBuf::from("/tmp/radar-logs")),
    };
    assert_eq!(log_dir(&config), Some(PathBuf::from("/tmp/radar-logs")));
  }

  #[test]
  fn test_bad_directive_falls_back() {
    let config = LogConfig {
      level: Some("[[not a filter".to_string()),
      dir: None,
    };
    // Must not panic
    let _ = filter(&config);
  }
}
