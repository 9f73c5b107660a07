use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_BASE_URL;
use crate::error::ConfigError;
use crate::store::RocketStore;

/// Everything needed to wire the application together.
///
/// Every key is optional in the TOML file; missing keys take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// API root, `/rockets` is appended.
    pub api_base_url: String,
    /// SQLite file holding the cached catalog.
    pub database_path: PathBuf,
    /// Per-request timeout for the HTTP client. No timeout when unset.
    pub request_timeout_secs: Option<u64>,
    pub logging: LoggingConfig,
    pub login: LoginConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            database_path: RocketStore::default_path(),
            request_timeout_secs: None,
            logging: LoggingConfig::default(),
            login: LoginConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Write JSON lines here instead of compact output on stderr.
    pub file: Option<PathBuf>,
}

/// The single account the login screen accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    pub email: String,
    pub password: String,
    pub forgot_password_url: String,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            email: "admin@lasalle.es".to_string(),
            password: "admin1234".to_string(),
            forgot_password_url: "https://lasallefp.com/contactar/".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api_base_url, "https://api.spacexdata.com/v4");
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_partial_file_overrides_only_given_keys() {
        let config = AppConfig::from_toml_str(
            r#"
            database_path = "/tmp/rockets.db"
            request_timeout_secs = 10

            [logging]
            level = "debug"

            [login]
            password = "hunter2hunter2"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/rockets.db"));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.file, None);
        assert_eq!(config.login.email, "admin@lasalle.es");
        assert_eq!(config.login.password, "hunter2hunter2");
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let err = AppConfig::from_toml_str("[logging]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rocket-catalog.toml");
        let mut config = AppConfig::default();
        config.logging.file = Some(PathBuf::from("rocket-catalog.log"));
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        assert_eq!(AppConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
