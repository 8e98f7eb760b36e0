use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  #[serde(default)]
  pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the content API, e.g. "https://content.example.com/"
  pub base_url: String,
}

/// Tuning for the fetch layer. The defaults match production behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
  /// Seconds a cached result stays fresh
  pub fresh_ttl_secs: u64,
  /// Deadline for one remote call, in seconds
  pub request_timeout_secs: u64,
  /// Delay before the single retry, in seconds
  pub retry_delay_secs: u64,
}

impl Default for FetchConfig {
  fn default() -> Self {
    Self {
      fresh_ttl_secs: 300,
      request_timeout_secs: 30,
      retry_delay_secs: 2,
    }
  }
}

impl FetchConfig {
  pub fn fresh_ttl(&self) -> chrono::Duration {
    chrono::Duration::seconds(self.fresh_ttl_secs as i64)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }

  pub fn retry_delay(&self) -> Duration {
    Duration::from_secs(self.retry_delay_secs)
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./showreel.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/showreel/config.yaml
  /// 4. ~/.config/showreel/config.yaml
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

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/showreel/config.yaml"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("showreel.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("showreel").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Get the API token for back-office writes from environment variables.
  ///
  /// Checks SHOWREEL_API_TOKEN first, then PORTFOLIO_API_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("SHOWREEL_API_TOKEN")
      .or_else(|_| std::env::var("PORTFOLIO_API_TOKEN"))
      .map_err(|_| {
        eyre!(
          "API token not found. Set SHOWREEL_API_TOKEN or PORTFOLIO_API_TOKEN environment variable."
        )
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fetch_defaults_match_production_behavior() {
    let fetch = FetchConfig::default();
    assert_eq!(fetch.fresh_ttl(), chrono::Duration::minutes(5));
    assert_eq!(fetch.request_timeout(), Duration::from_secs(30));
    assert_eq!(fetch.retry_delay(), Duration::from_secs(2));
  }

  #[test]
  fn partial_yaml_falls_back_to_defaults() {
    let config: Config = serde_yaml::from_str(
      "api:\n  base_url: https://content.example.com/\nfetch:\n  fresh_ttl_secs: 60\n",
    )
    .unwrap();

    assert_eq!(config.api.base_url, "https://content.example.com/");
    assert_eq!(config.fetch.fresh_ttl_secs, 60);
    assert_eq!(config.fetch.request_timeout_secs, 30);
  }
}
