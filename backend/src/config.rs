//! Application configuration.
//!
//! Configuration is resolved once at process start: an optional TOML file
//! provides the base values, environment variables override them, and the
//! resulting [`AppConfig`] is passed explicitly into the repository factory,
//! the narrative generator and the prediction service.
//!
//! # Environment Variables
//! - `CYCLE_CONFIG`: path of a TOML configuration file
//! - `HOST` / `PORT`: bind address (default: 0.0.0.0:8080)
//! - `REPOSITORY_TYPE`: `sqlite` or `local` (default: sqlite)
//! - `DATABASE_PATH`: SQLite database file (default: cycles.db)
//! - `SQLITE_POOL_MAX`: maximum pool size (default: 4)
//! - `SQLITE_BUSY_TIMEOUT_MS`: SQLite busy timeout (default: 5000)
//! - `PREDICTION_STALE_HOURS`: cache staleness threshold (default: 24)
//! - `OPENAI_API_KEY`: narrative service credential (optional)
//! - `OPENAI_MODEL`: narrative model (default: gpt-4o-mini)
//! - `OPENAI_BASE_URL`: narrative API base URL
//! - `NARRATIVE_TIMEOUT_SECS`: narrative request timeout (default: 20)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::services::cache::MAX_STALE_THRESHOLD_HOURS;
pub use crate::db::repo_config::{RepositoryConfig, RepositorySettings, SqliteSettings};

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// HTTP bind settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Prediction cache policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionSettings {
    /// A cached prediction older than this is recomputed.
    pub stale_threshold_hours: i64,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            stale_threshold_hours: 24,
        }
    }
}

/// Narrative service settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeSettings {
    /// Absent means every prediction uses the fallback text.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for NarrativeSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 20,
        }
    }
}

impl fmt::Debug for NarrativeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NarrativeSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Complete process configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    #[serde(flatten)]
    pub storage: RepositoryConfig,
    pub prediction: PredictionSettings,
    pub narrative: NarrativeSettings,
}

impl AppConfig {
    /// Parse configuration from TOML text. Missing sections take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve configuration from the process environment.
    ///
    /// Uses `CYCLE_CONFIG` (or `cycle.toml` / `backend/cycle.toml` when
    /// present) as the base, then applies environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = match lookup("CYCLE_CONFIG") {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) => Self::from_file(path)?,
                None => Self::default(),
            },
        };
        base.with_overrides(lookup)
    }

    /// Apply environment-style overrides on top of this configuration.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = parse_var(&lookup, "PORT")? {
            self.server.port = port;
        }
        if let Some(repo_type) = lookup("REPOSITORY_TYPE") {
            self.storage.repository.repo_type = repo_type;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.storage.sqlite.database_path = path;
        }
        if let Some(max) = parse_var(&lookup, "SQLITE_POOL_MAX")? {
            self.storage.sqlite.max_connections = max;
        }
        if let Some(busy) = parse_var(&lookup, "SQLITE_BUSY_TIMEOUT_MS")? {
            self.storage.sqlite.busy_timeout_ms = busy;
        }
        if let Some(hours) = parse_var(&lookup, "PREDICTION_STALE_HOURS")? {
            self.prediction.stale_threshold_hours = hours;
        }
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.narrative.api_key = Some(key);
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            self.narrative.model = model;
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.narrative.base_url = url;
        }
        if let Some(secs) = parse_var(&lookup, "NARRATIVE_TIMEOUT_SECS")? {
            self.narrative.timeout_secs = secs;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let hours = self.prediction.stale_threshold_hours;
        if !(0..=MAX_STALE_THRESHOLD_HOURS).contains(&hours) {
            return Err(ConfigError::InvalidValue {
                key: "prediction.stale_threshold_hours",
                value: hours.to_string(),
            });
        }
        if self.storage.sqlite.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "sqlite.max_connections",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

fn default_config_path() -> Option<PathBuf> {
    ["cycle.toml", "backend/cycle.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.prediction.stale_threshold_hours, 24);
        assert_eq!(config.storage.repository.repo_type, "sqlite");
        assert_eq!(config.storage.sqlite.database_path, "cycles.db");
        assert_eq!(config.narrative.model, "gpt-4o-mini");
        assert!(config.narrative.api_key.is_none());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = AppConfig::from_toml_str(
            r#"
[server]
port = 3002

[repository]
type = "local"

[prediction]
stale_threshold_hours = 6
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 3002);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.repository.repo_type, "local");
        assert_eq!(config.prediction.stale_threshold_hours, 6);
        assert_eq!(config.narrative.timeout_secs, 20);
    }

    #[test]
    fn test_env_overrides_apply() {
        let config = AppConfig::default()
            .with_overrides(lookup_from(&[
                ("PORT", "9000"),
                ("DATABASE_PATH", "/data/cycles.db"),
                ("PREDICTION_STALE_HOURS", "12"),
                ("OPENAI_API_KEY", "sk-test"),
                ("NARRATIVE_TIMEOUT_SECS", "5"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.sqlite.database_path, "/data/cycles.db");
        assert_eq!(config.prediction.stale_threshold_hours, 12);
        assert_eq!(config.narrative.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.narrative.timeout_secs, 5);
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let config = AppConfig::default()
            .with_overrides(lookup_from(&[("OPENAI_API_KEY", "  ")]))
            .unwrap();
        assert!(config.narrative.api_key.is_none());
    }

    #[test]
    fn test_invalid_numeric_override_is_an_error() {
        let err = AppConfig::default()
            .with_overrides(lookup_from(&[("PREDICTION_STALE_HOURS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "PREDICTION_STALE_HOURS",
                ..
            }
        ));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let err = AppConfig::default()
            .with_overrides(lookup_from(&[("PREDICTION_STALE_HOURS", "-1")]))
            .unwrap_err();
        assert!(err.to_string().contains("stale_threshold_hours"));
    }

    #[test]
    fn test_oversized_threshold_rejected() {
        let err = AppConfig::default()
            .with_overrides(lookup_from(&[(
                "PREDICTION_STALE_HOURS",
                "9223372036854775807",
            )]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "prediction.stale_threshold_hours",
                ..
            }
        ));

        let at_limit = MAX_STALE_THRESHOLD_HOURS.to_string();
        assert!(AppConfig::default()
            .with_overrides(lookup_from(&[("PREDICTION_STALE_HOURS", at_limit.as_str())]))
            .is_ok());
    }

    #[test]
    fn test_toml_threshold_is_validated() {
        let err = AppConfig::from_toml_str("[prediction]\nstale_threshold_hours = -3\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = NarrativeSettings {
            api_key: Some("sk-secret".to_string()),
            ..NarrativeSettings::default()
        };
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_missing_config_file_reports_path() {
        let err = AppConfig::from_file("/nonexistent/cycle.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cycle.toml"));
    }
}
