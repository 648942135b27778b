//! Repository factory for dependency injection.
//!
//! Creates repository instances from runtime configuration. Callers receive an
//! `Arc<dyn FullRepository>` and never name the concrete backend.

use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
#[cfg(feature = "local-repo")]
use super::repositories::LocalRepository;
#[cfg(feature = "sqlite-repo")]
use super::repositories::SqliteRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use super::SqliteConfig;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// SQLite + Diesel implementation
    Sqlite,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Accepts "sqlite", "sqlite3" or "local" (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use cycle_predictor::db::{RepositoryFactory, RepositoryType, SqliteConfig};
///
/// let config = SqliteConfig::with_path("cycles.db");
/// let repo = RepositoryFactory::create(RepositoryType::Sqlite, Some(&config)).await?;
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// `sqlite_config` is required for [`RepositoryType::Sqlite`] and ignored
    /// otherwise.
    pub async fn create(
        repo_type: RepositoryType,
        sqlite_config: Option<&SqliteConfig>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Sqlite => {
                #[cfg(feature = "sqlite-repo")]
                {
                    let config = sqlite_config.ok_or_else(|| {
                        RepositoryError::configuration(
                            "SQLite repository requires SqliteConfig",
                        )
                    })?;
                    let repo = Self::create_sqlite(config).await?;
                    Ok(repo as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "sqlite-repo"))]
                {
                    let _ = sqlite_config;
                    Err(RepositoryError::configuration(
                        "SQLite repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => Self::create_local(),
        }
    }

    /// Open a SQLite repository.
    ///
    /// Pool construction and migrations block, so they run off the async
    /// executor.
    #[cfg(feature = "sqlite-repo")]
    pub async fn create_sqlite(config: &SqliteConfig) -> RepositoryResult<Arc<SqliteRepository>> {
        let config = config.clone();
        let repo = tokio::task::spawn_blocking(move || SqliteRepository::new(config))
            .await
            .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;
        Ok(Arc::new(repo))
    }

    /// Create an in-memory local repository.
    pub fn create_local() -> RepositoryResult<Arc<dyn FullRepository>> {
        #[cfg(feature = "local-repo")]
        {
            Ok(Arc::new(LocalRepository::new()))
        }
        #[cfg(not(feature = "local-repo"))]
        {
            Err(RepositoryError::configuration(
                "Local repository feature not enabled",
            ))
        }
    }

    /// Create the repository described by the storage section of the
    /// application configuration.
    pub async fn from_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;
        let sqlite_config = config.to_sqlite_config()?;

        log::info!("Creating {:?} repository", repo_type);
        Self::create(repo_type, sqlite_config.as_ref()).await
    }
}
