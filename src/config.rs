use crate::api::types::SortOrder;
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the API base URL.
pub const API_URL_ENV: &str = "RELEASE_RADAR_API_URL";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub views: ViewsConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  #[serde(default = "default_api_url")]
  pub base_url: String,
  /// Per-request timeout in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_api_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewsConfig {
  /// How many months the upcoming view asks for (server accepts 1-4)
  #[serde(default = "default_upcoming_months")]
  pub upcoming_months: u32,
  /// Publisher slug applied to the current and upcoming listings
  pub publisher: Option<String>,
  /// Region code applied to the current and upcoming listings
  pub region: Option<String>,
  /// Ordering for the current listing: date, title or publisher
  pub sort: Option<SortOrder>,
}

impl Default for ViewsConfig {
  fn default() -> Self {
    Self {
      upcoming_months: default_upcoming_months(),
      publisher: None,
      region: None,
      sort: None,
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
  /// Filter directive, e.g. "debug" or "release_radar=trace"
  pub level: Option<String>,
  /// Directory for log files (defaults to the data directory)
  pub dir: Option<PathBuf>,
}

fn default_api_url() -> String {
  DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
  30
}

fn default_upcoming_months() -> u32 {
  3
}

impl Config {
  /// Load configuration.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./release-radar.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/release-radar/config.yaml
  ///
  /// A missing file is not an error; defaults apply. The API URL from
  /// `RELEASE_RADAR_API_URL` wins over the file.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };

    if let Ok(url) = std::env::var(API_URL_ENV) {
      config.apply_api_url(Some(url));
    }

    config.validate()?;
    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("release-radar.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("release-radar").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file deserializes as null
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Replace the API base URL when `url` is set and non-blank.
  pub fn apply_api_url(&mut self, url: Option<String>) {
    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
      self.api.base_url = url.trim().to_string();
    }
  }

  fn validate(&self) -> Result<()> {
    if !(1..=4).contains(&self.views.upcoming_months) {
      return Err(eyre!(
        "views.upcoming_months must be between 1 and 4, got {}",
        self.views.upcoming_months
      ));
    }
    if self.api.timeout_secs == 0 {
      return Err(eyre!("api.timeout_secs must be greater than 0"));
    }
    Ok(())
  }
}
