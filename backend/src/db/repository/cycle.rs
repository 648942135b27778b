//! Cycle history repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::cycle::Cycle;

/// Repository trait for recorded cycles.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait CycleRepository: Send + Sync {
    /// Check if the store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the store is healthy
    /// - `Ok(false)` if it is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Persist a cycle and return it with its assigned id.
    ///
    /// Any `id` already set on `cycle` is ignored.
    async fn insert_cycle(&self, cycle: &Cycle) -> RepositoryResult<Cycle>;

    /// All recorded cycles in history order (ascending `start`, then id).
    async fn list_cycles(&self) -> RepositoryResult<Vec<Cycle>>;
}
