//! Repository configuration file support.
//!
//! These settings are the `[repository]` and `[sqlite]` sections of the
//! application TOML file (see [`crate::config::AppConfig`]).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::RepositoryError;
use crate::db::SqliteConfig;

/// Storage section of the application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub sqlite: SqliteSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default = "default_repo_type")]
    pub repo_type: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: default_repo_type(),
        }
    }
}

/// SQLite connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteSettings {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for SqliteSettings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            max_connections: default_max_connections(),
            connect_timeout: default_connect_timeout(),
            busy_timeout_ms: default_busy_timeout_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_repo_type() -> String {
    "sqlite".to_string()
}

fn default_database_path() -> String {
    "cycles.db".to_string()
}

fn default_max_connections() -> u32 {
    4
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

impl RepositoryConfig {
    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// Convert to SqliteConfig if this is a SQLite configuration.
    #[cfg(feature = "sqlite-repo")]
    pub fn to_sqlite_config(&self) -> Result<Option<SqliteConfig>, RepositoryError> {
        let repo_type = self.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        if repo_type != RepositoryType::Sqlite {
            return Ok(None);
        }

        if self.sqlite.database_path.trim().is_empty() {
            return Err(RepositoryError::configuration(
                "SQLite repository requires 'sqlite.database_path' setting".to_string(),
            ));
        }

        Ok(Some(SqliteConfig {
            database_path: self.sqlite.database_path.clone(),
            max_pool_size: self.sqlite.max_connections,
            connection_timeout_sec: self.sqlite.connect_timeout,
            busy_timeout_ms: self.sqlite.busy_timeout_ms,
            max_retries: self.sqlite.max_retries,
            retry_delay_ms: self.sqlite.retry_delay_ms,
        }))
    }

    /// Convert to SqliteConfig when the feature is disabled.
    #[cfg(not(feature = "sqlite-repo"))]
    pub fn to_sqlite_config(&self) -> Result<Option<SqliteConfig>, RepositoryError> {
        let repo_type = self.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        if repo_type == RepositoryType::Sqlite {
            return Err(RepositoryError::configuration(
                "SQLite repository feature not enabled".to_string(),
            ));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_config() {
        let toml = r#"
[repository]
type = "local"
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.repository.repo_type, "local");
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
        assert!(config.to_sqlite_config().unwrap().is_none());
    }

    #[cfg(feature = "sqlite-repo")]
    #[test]
    fn test_parse_sqlite_config() {
        let toml = r#"
[repository]
type = "sqlite"

[sqlite]
database_path = "/data/periods.db"
max_connections = 8
busy_timeout_ms = 250
max_retries = 5
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Sqlite);

        let sqlite = config.to_sqlite_config().unwrap().unwrap();
        assert_eq!(sqlite.database_path, "/data/periods.db");
        assert_eq!(sqlite.max_pool_size, 8);
        assert_eq!(sqlite.busy_timeout_ms, 250);
        assert_eq!(sqlite.max_retries, 5);
        assert_eq!(sqlite.retry_delay_ms, 100);
        assert_eq!(sqlite.connection_timeout_sec, 30);
    }

    #[cfg(feature = "sqlite-repo")]
    #[test]
    fn test_sqlite_requires_database_path() {
        let toml = r#"
[repository]
type = "sqlite"

[sqlite]
database_path = " "
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert!(config.to_sqlite_config().is_err());
    }

    #[test]
    fn test_unknown_repository_type() {
        let config = RepositoryConfig {
            repository: RepositorySettings {
                repo_type: "postgres".to_string(),
            },
            ..Default::default()
        };
        assert!(config.repository_type().is_err());
        assert!(config.to_sqlite_config().is_err());
    }
}
