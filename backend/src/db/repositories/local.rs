//! In-memory local repository implementation.
//!
//! Stores cycles and predictions in plain vectors behind a lock. Suitable for
//! unit tests and local development; nothing survives a restart.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::api::{CycleId, PredictionId};
use crate::db::repository::{
    CycleRepository, ErrorContext, PredictionRepository, RepositoryError, RepositoryResult,
};
use crate::models::cycle::{sort_history, Cycle};
use crate::models::prediction::Prediction;

/// In-memory local repository.
///
/// Clones share the same underlying data.
///
/// # Example
/// ```
/// use cycle_predictor::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// assert_eq!(repo.cycle_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    cycles: Vec<Cycle>,
    predictions: Vec<(PredictionId, Prediction)>,
    next_cycle_id: i64,
    next_prediction_id: i64,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            cycles: Vec::new(),
            predictions: Vec::new(),
            next_cycle_id: 1,
            next_prediction_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store going down (or coming back).
    ///
    /// While unhealthy every operation fails with a connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Drop all stored data and reset id counters.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let healthy = data.is_healthy;
        *data = LocalData {
            is_healthy: healthy,
            ..Default::default()
        };
    }

    pub fn cycle_count(&self) -> usize {
        self.data.read().cycles.len()
    }

    pub fn prediction_count(&self) -> usize {
        self.data.read().predictions.len()
    }

    fn ensure_healthy(&self, operation: &str) -> RepositoryResult<()> {
        if self.data.read().is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::unavailable(
                "local repository is marked unhealthy",
                ErrorContext::new(operation),
            ))
        }
    }
}

#[async_trait]
impl CycleRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn insert_cycle(&self, cycle: &Cycle) -> RepositoryResult<Cycle> {
        self.ensure_healthy("insert_cycle")?;
        cycle.validate()?;

        let mut data = self.data.write();
        let id = CycleId(data.next_cycle_id);
        data.next_cycle_id += 1;

        let stored = cycle.clone().with_id(id);
        data.cycles.push(stored.clone());
        Ok(stored)
    }

    async fn list_cycles(&self) -> RepositoryResult<Vec<Cycle>> {
        self.ensure_healthy("list_cycles")?;
        let mut cycles = self.data.read().cycles.clone();
        sort_history(&mut cycles);
        Ok(cycles)
    }
}

#[async_trait]
impl PredictionRepository for LocalRepository {
    async fn insert_prediction(&self, prediction: &Prediction) -> RepositoryResult<PredictionId> {
        self.ensure_healthy("insert_prediction")?;

        let mut data = self.data.write();
        let id = PredictionId(data.next_prediction_id);
        data.next_prediction_id += 1;
        data.predictions.push((id, prediction.clone()));
        Ok(id)
    }

    async fn latest_prediction(&self) -> RepositoryResult<Option<Prediction>> {
        self.ensure_healthy("latest_prediction")?;
        Ok(self
            .data
            .read()
            .predictions
            .iter()
            .max_by_key(|(id, p)| (p.created_at, *id))
            .map(|(_, p)| p.clone()))
    }
}
