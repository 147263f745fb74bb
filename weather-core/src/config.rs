use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use url::Url;

use crate::error::{Result, WeatherError};

pub const DEFAULT_API_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_TIMEZONE: &str = "auto";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Connection parameters for the Redis cache backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_host")]
    pub host: String,

    #[serde(default = "default_redis_port")]
    pub port: u16,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub db: i64,

    /// Expiry for cached entries. Entries live forever when absent.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_redis_host(),
            port: default_redis_port(),
            password: None,
            db: 0,
            ttl_secs: None,
        }
    }
}

impl RedisConfig {
    /// `redis://` connection URL with the password percent-encoded.
    pub fn connection_url(&self) -> std::result::Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("redis://{}:{}/{}", self.host, self.port, self.db))?;
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            // Only fails for URLs without a host, which the format above rules out.
            let _ = url.set_password(Some(password));
        }
        Ok(url)
    }

    /// Same as [`Self::connection_url`] with the password masked, for logs.
    pub fn display_url(&self) -> String {
        match self.password.as_deref().filter(|p| !p.is_empty()) {
            Some(_) => format!("redis://:***@{}:{}/{}", self.host, self.port, self.db),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

/// Top-level configuration read from a YAML file at startup.
///
/// Example:
/// ```yaml
/// api_url: https://api.open-meteo.com/v1/forecast
/// timezone: Europe/Warsaw
/// redis:
///   host: localhost
///   port: 6379
///   password: secret
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,

    /// Overall timeout for each outbound HTTP request.
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,

    /// Cache backend. Caching is disabled when the section is absent.
    #[serde(default)]
    pub redis: Option<RedisConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timezone: default_timezone(),
            geocoder_url: default_geocoder_url(),
            http_timeout_secs: None,
            redis: None,
        }
    }
}

impl Config {
    /// Load config from `path`. A missing or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| WeatherError::ConfigLoad {
            path: path.to_path_buf(),
            reason: format!("failed to read file: {e}"),
        })?;

        Self::from_yaml(&contents).map_err(|reason| WeatherError::ConfigLoad {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse config from YAML text.
    pub fn from_yaml(contents: &str) -> std::result::Result<Self, String> {
        // An empty document deserializes to unit, not to an all-defaults mapping.
        if contents.trim().is_empty() {
            return Err("file is empty".to_string());
        }
        serde_yaml::from_str(contents).map_err(|e| format!("invalid YAML: {e}"))
    }

    /// Where to look for the config file when none is given on the command line:
    /// `config.yaml` in the working directory if present, otherwise the
    /// platform config directory.
    pub fn default_path() -> PathBuf {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return local;
        }

        Self::config_file_path().unwrap_or(local)
    }

    /// Path to the config file in the platform config directory.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "weather-task", "weather-cli")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_geocoder_url() -> String {
    DEFAULT_GEOCODER_URL.to_string()
}

fn default_redis_host() -> String {
    "localhost".to_string()
}

fn default_redis_port() -> u16 {
    6379
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let yaml = r#"
api_url: https://archive-api.open-meteo.com/v1/archive
timezone: Europe/Warsaw
geocoder_url: http://localhost:8080
http_timeout_secs: 15
redis:
  host: cache.local
  port: 6380
  password: hunter2
  db: 2
  ttl_secs: 3600
"#;
        let cfg = Config::from_yaml(yaml).expect("valid config");

        assert_eq!(cfg.api_url, "https://archive-api.open-meteo.com/v1/archive");
        assert_eq!(cfg.timezone, "Europe/Warsaw");
        assert_eq!(cfg.geocoder_url, "http://localhost:8080");
        assert_eq!(cfg.http_timeout(), Some(Duration::from_secs(15)));

        let redis = cfg.redis.expect("redis section");
        assert_eq!(redis.host, "cache.local");
        assert_eq!(redis.port, 6380);
        assert_eq!(redis.password.as_deref(), Some("hunter2"));
        assert_eq!(redis.db, 2);
        assert_eq!(redis.ttl_secs, Some(3600));
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg = Config::from_yaml("timezone: UTC\n").expect("valid config");

        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.geocoder_url, DEFAULT_GEOCODER_URL);
        assert_eq!(cfg.timezone, "UTC");
        assert!(cfg.redis.is_none());
    }

    #[test]
    fn partial_redis_section_uses_defaults() {
        let cfg = Config::from_yaml("redis:\n  password: pw\n").expect("valid config");
        let redis = cfg.redis.expect("redis section");

        assert_eq!(redis.host, "localhost");
        assert_eq!(redis.port, 6379);
        assert_eq!(redis.ttl_secs, None);
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let err = Config::from_yaml("api_url: [unclosed\n").unwrap_err();
        assert!(err.contains("invalid YAML"));
    }

    #[test]
    fn empty_file_is_rejected() {
        assert!(Config::from_yaml("  \n").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here/config.yaml")).unwrap_err();

        assert!(matches!(err, WeatherError::ConfigLoad { .. }));
        assert!(err.to_string().contains("/definitely/not/here/config.yaml"));
    }

    #[test]
    fn connection_url_encodes_password() {
        let redis = RedisConfig {
            password: Some("p@ss word".into()),
            ..RedisConfig::default()
        };
        let url = redis.connection_url().expect("valid url");

        assert_eq!(url.as_str(), "redis://:p%40ss%20word@localhost:6379/0");
        assert_eq!(redis.display_url(), "redis://:***@localhost:6379/0");
    }

    #[test]
    fn connection_url_without_password() {
        let redis = RedisConfig::default();
        let url = redis.connection_url().expect("valid url");

        assert_eq!(url.as_str(), "redis://localhost:6379/0");
    }
}
