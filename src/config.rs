//! Settings for connecting to the asset service and presenting the data
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::debounce::DEFAULT_QUIET_PERIOD;
use crate::format::DEFAULT_CURRENCY_SYMBOL;
use crate::table::{PageSize, TableError};

pub const URL_ENV: &str = "ASSETQL_URL";
pub const PAGE_SIZE_ENV: &str = "ASSETQL_PAGE_SIZE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found '{0}'")]
    NotFound(PathBuf),
    #[error("failed to read config '{path}'")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config '{path}'")]
    ParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid page size")]
    InvalidPageSize(#[from] TableError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the asset service, the REST paths are appended to it
    pub base_url: String,
    /// Rows per table page, either a number or "all"
    pub page_size: String,
    pub search_debounce_ms: u64,
    pub currency_symbol: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: "http://127.0.0.1:8000".to_string(),
            page_size: PageSize::default().to_string(),
            search_debounce_ms: DEFAULT_QUIET_PERIOD.as_millis() as u64,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            request_timeout_secs: 10,
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
}

/// `~/.assetql/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".assetql").join("config.json"))
}

impl Config {
    /// Read the configuration from a JSON file, fields missing in the file keep
    /// their default. A missing file yields the defaults if `allow_missing` is set.
    pub fn load(path: &Path, allow_missing: bool) -> Result<Config, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| ConfigError::ParseFailed {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
                Ok(Config::default())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ConfigError::NotFound(path.to_path_buf()))
            }
            Err(source) => Err(ConfigError::ReadFailed {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Apply overrides from the process environment
    pub fn with_env(self) -> Config {
        self.with_overrides(env::var(URL_ENV).ok(), env::var(PAGE_SIZE_ENV).ok())
    }

    pub fn with_overrides(mut self, base_url: Option<String>, page_size: Option<String>) -> Config {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(size) = page_size.filter(|s| !s.trim().is_empty()) {
            self.page_size = size;
        }
        self
    }

    pub fn page_size(&self) -> Result<PageSize, ConfigError> {
        Ok(self.page_size.parse()?)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("assetql-{}-{}.json", name, std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.page_size().unwrap(), PageSize::default());
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.currency_symbol, "¥");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let path = temp_config("partial", r#"{"base_url":"http://assets.local:9000","page_size":"all"}"#);
        let config = Config::load(&path, false).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.base_url, "http://assets.local:9000");
        assert_eq!(config.page_size().unwrap(), PageSize::All);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn missing_and_broken_files() {
        let path = env::temp_dir().join("assetql-does-not-exist.json");
        assert_eq!(Config::load(&path, true).unwrap(), Config::default());
        assert!(matches!(Config::load(&path, false), Err(ConfigError::NotFound(_))));

        let path = temp_config("broken", "{ not json");
        let result = Config::load(&path, true);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::ParseFailed { .. })));
    }

    #[test]
    fn overrides_win() {
        let config = Config::default().with_overrides(Some("http://10.0.0.2:8000".to_string()), Some("  ".to_string()));
        assert_eq!(config.base_url, "http://10.0.0.2:8000");
        assert_eq!(config.page_size, "25");

        let config = Config {
            page_size: "zero".to_string(),
            ..Config::default()
        };
        assert!(config.page_size().is_err());
    }
}
