use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::ResourceKind;
use crate::controller::Timings;

const DEFAULT_API_URL: &str = "https://rickandmortyapi.com/api";

/// Environment variable that overrides `api_url`
const API_URL_ENV: &str = "C137_API_URL";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Base URL of the catalog API
  pub api_url: String,
  pub request_timeout_secs: u64,
  pub cache: CacheConfig,
  pub timings: TimingsConfig,
  /// Log file (default: $XDG_DATA_HOME/c137/c137.log)
  pub log_file: Option<PathBuf>,
  /// Tab shown first after login
  pub start_view: ResourceKind,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api_url: DEFAULT_API_URL.to_string(),
      request_timeout_secs: 10,
      cache: CacheConfig::default(),
      timings: TimingsConfig::default(),
      log_file: None,
      start_view: ResourceKind::Characters,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// How long a fetched page stays servable from memory
  pub ttl_secs: u64,
  /// Optional cap on stored pages; oldest entry goes first
  pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      ttl_secs: 5 * 60,
      max_entries: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingsConfig {
  /// Quiet period before a typed filter is applied
  pub debounce_ms: u64,
  /// Extra delay after the last debounced field settles
  pub settle_guard_ms: u64,
  /// Minimum time the loading indicator stays up for a network fetch
  pub min_loading_ms: u64,
}

impl Default for TimingsConfig {
  fn default() -> Self {
    Self {
      debounce_ms: 300,
      settle_guard_ms: 300,
      min_loading_ms: 500,
    }
  }
}

impl TimingsConfig {
  pub fn to_timings(&self) -> Timings {
    Timings {
      debounce: Duration::from_millis(self.debounce_ms),
      settle_guard: Duration::from_millis(self.settle_guard_ms),
      min_loading: Duration::from_millis(self.min_loading_ms),
    }
  }
}

impl Config {
  /// Load configuration.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./c137.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/c137/config.yaml
  ///
  /// With no file found the defaults are used. `C137_API_URL` overrides
  /// `api_url` either way.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = match explicit_path {
      Some(p) if p.exists() => Some(p.to_path_buf()),
      Some(p) => return Err(eyre!("Config file not found: {}", p.display())),
      None => Self::find_config_file(),
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };

    if let Ok(url) = std::env::var(API_URL_ENV) {
      config.api_url = url;
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("c137.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("c137").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file deserializes to unit, not an empty map
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  pub fn cache_ttl(&self) -> Duration {
    Duration::from_secs(self.cache.ttl_secs)
  }
}
