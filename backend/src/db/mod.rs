//! Database module for cycle and prediction storage.
//!
//! Storage is reached through the repository pattern so the SQLite backend and
//! the in-memory backend are interchangeable.
//!
//! # Module Organization
//! - `services`: High-level operations (use these from application code)
//! - `repository`: Trait definitions for storage operations
//! - `repositories::sqlite`: SQLite implementation with Diesel ORM
//! - `repositories::local`: In-memory implementation for tests and local development
//! - `factory`: Creates repository instances from configuration
//! - `repo_config`: `[repository]` / `[sqlite]` configuration sections
//!
//! # Recommended Usage
//!
//! ```ignore
//! use cycle_predictor::db::{services, RepositoryConfig, RepositoryFactory};
//!
//! async fn example(config: &RepositoryConfig) -> anyhow::Result<()> {
//!     let repo = RepositoryFactory::from_config(config).await?;
//!     let history = services::list_cycles(repo.as_ref()).await?;
//!     Ok(())
//! }
//! ```

#[cfg(not(any(feature = "sqlite-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;


// SQLite config is colocated with the repository implementation.
#[cfg(feature = "sqlite-repo")]
pub use repositories::sqlite::SqliteConfig;
#[cfg(not(feature = "sqlite-repo"))]
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    _private: (),
}

pub use services::{
    health_check, latest_prediction, list_cycles, load_history, record_cycle, store_prediction,
};

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
#[cfg(feature = "local-repo")]
pub use repositories::LocalRepository;
#[cfg(feature = "sqlite-repo")]
pub use repositories::SqliteRepository;
pub use repository::{
    CycleRepository, ErrorContext, FullRepository, PredictionRepository, RepositoryError,
    RepositoryResult,
};
