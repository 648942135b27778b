//! Repository implementations module.
//!
//! - `sqlite`: SQLite implementation with Diesel ORM
//! - `local`: In-memory implementation for unit testing and local development
#[cfg(feature = "local-repo")]
pub mod local;
#[cfg(feature = "sqlite-repo")]
pub mod sqlite;

#[cfg(feature = "local-repo")]
pub use local::LocalRepository;
#[cfg(feature = "sqlite-repo")]
pub use sqlite::{SqliteConfig, SqliteRepository};
