use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::api::QueryOptions;
use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "where.yahooapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const GEOCODE_PATH: &str = "/geocode";

/// Connection settings for the geocoding service.
///
/// Built once and handed to [`PlacefinderClient::new`](crate::api::PlacefinderClient::new);
/// the client never changes it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Host name, optionally with an `http://` or `https://` scheme and port
    pub host: String,
    /// Application id sent as the `appid` parameter
    pub app_id: String,
    /// Connect and read timeout for each request
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            app_id: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ServiceConfig {
    pub fn new(host: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            app_id: app_id.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL of the `/geocode` endpoint. Bare hosts are reached over plain HTTP.
    pub fn endpoint(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{host}{GEOCODE_PATH}")
        } else {
            format!("http://{host}{GEOCODE_PATH}")
        }
    }
}

/// Optional settings file (`placefinder.toml`)
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct FileConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub flags: Option<String>,
}

impl FileConfig {
    /// Load the first parseable config file on the search path
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if !path.exists() {
                continue;
            }
            match Self::from_path(&path) {
                Ok(config) => return Some(config),
                Err(e) => warn!("Skipping config file: {e}"),
            }
        }
        None
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Service settings, with built-in defaults for anything unset
    pub fn service_config(&self) -> ServiceConfig {
        let defaults = ServiceConfig::default();
        ServiceConfig {
            host: self.host.clone().unwrap_or(defaults.host),
            app_id: self.app_id.clone().unwrap_or(defaults.app_id),
            timeout: self
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// Per-call options carrying the file's locale and flags
    pub fn query_options(&self) -> QueryOptions {
        let mut options = QueryOptions::new();
        options.params.locale = self.locale.clone();
        options.params.flags = self.flags.clone();
        options
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("placefinder.toml"));
    paths.push(PathBuf::from(".placefinder.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("placefinder").join("config.toml"));
        paths.push(config_dir.join("placefinder.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".placefinder.toml"));
        paths.push(home.join(".config").join("placefinder").join("config.toml"));
    }

    paths
}
