use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub tmdb: TmdbConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
  /// API root, e.g. "https://api.themoviedb.org/3"
  pub base_url: String,
  /// Applies to connect and whole-request timeouts
  pub request_timeout_secs: u64,
  /// Retries for 5xx responses
  pub max_retries: u32,
}

impl Default for TmdbConfig {
  fn default() -> Self {
    Self {
      base_url: "https://api.themoviedb.org/3".to_string(),
      request_timeout_secs: 15,
      max_retries: 3,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// How long cached data stays fresh
  pub ttl_minutes: i64,
  /// Database file (defaults to $XDG_DATA_HOME/movieshelf/cache.db)
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      ttl_minutes: 5,
      path: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
  pub debounce_ms: u64,
  /// Shorter queries show trending movies instead of searching
  pub min_query_len: usize,
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      debounce_ms: 300,
      min_query_len: 2,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./movieshelf.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/movieshelf/config.yaml
  ///
  /// Without an explicit path, a missing file means built-in defaults.
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
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("movieshelf.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("movieshelf").join("config.yaml");
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

  /// Location of the SQLite cache
  pub fn cache_path(&self) -> Result<PathBuf> {
    match &self.cache.path {
      Some(p) => Ok(p.clone()),
      None => Ok(Self::data_dir()?.join("cache.db")),
    }
  }

  /// Per-user data directory for the cache and log files
  pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("movieshelf"))
  }

  /// Get the TMDB API read access token from environment variables.
  ///
  /// Checks MOVIESHELF_TMDB_TOKEN first, then TMDB_API_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("MOVIESHELF_TMDB_TOKEN")
      .or_else(|_| std::env::var("TMDB_API_TOKEN"))
      .map_err(|_| {
        eyre!(
          "TMDB API token not found. Set MOVIESHELF_TMDB_TOKEN or TMDB_API_TOKEN environment variable."
        )
      })
  }

  pub fn ttl(&self) -> chrono::Duration {
    chrono::Duration::minutes(self.cache.ttl_minutes)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_partial_config_uses_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "cache:\n  ttl_minutes: 10\nsearch:\n  debounce_ms: 150").unwrap();

    let config = Config::load(Some(file.path())).unwrap();

    assert_eq!(config.cache.ttl_minutes, 10);
    assert_eq!(config.search.debounce_ms, 150);
    assert_eq!(config.search.min_query_len, 2);
    assert_eq!(config.tmdb.base_url, "https://api.themoviedb.org/3");
    assert_eq!(config.tmdb.max_retries, 3);
    assert_eq!(config.ttl(), chrono::Duration::minutes(10));
  }

  #[test]
  fn test_explicit_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    assert!(Config::load(Some(&missing)).is_err());
  }

  #[test]
  fn test_invalid_yaml_is_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "cache: [not, a, map]").unwrap();
    assert!(Config::load(Some(file.path())).is_err());
  }

  #[test]
  fn test_explicit_cache_path() {
    let config = Config {
      cache: CacheConfig {
        ttl_minutes: 5,
        path: Some(PathBuf::from("/tmp/movies.db")),
      },
      ..Config::default()
    };
    assert_eq!(config.cache_path().unwrap(), PathBuf::from("/tmp/movies.db"));
  }
}
