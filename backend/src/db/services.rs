//! High-level database service layer.
//!
//! Repository-agnostic operations used by the HTTP handlers and the
//! prediction service. Validation that must hold regardless of the backend
//! (cycle ordering, prediction invariants) is enforced here before anything
//! reaches storage.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  HTTP handlers / PredictionService          │
//! └───────────────────┬─────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────┐
//! │  Service Layer (services.rs)                │
//! └───────────────────┬─────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────┐
//! │  Repository Traits (repository/)            │
//! │  - CycleRepository                          │
//! │  - PredictionRepository                     │
//! └───────────────────┬─────────────────────────┘
//!         ┌───────────┴────────────┐
//! ┌───────▼──────────┐   ┌─────────▼─────────┐
//! │ SQLite (Diesel)  │   │ Local (in-memory) │
//! └──────────────────┘   └───────────────────┘
//! ```

use log::{debug, info};

use super::repository::{FullRepository, RepositoryResult};
use crate::api::PredictionId;
use crate::models::cycle::Cycle;
use crate::models::prediction::Prediction;

/// Check if the store is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Validate and persist a new cycle, returning it with its assigned id.
pub async fn record_cycle<R: FullRepository + ?Sized>(
    repo: &R,
    cycle: &Cycle,
) -> RepositoryResult<Cycle> {
    cycle.validate()?;
    let stored = repo.insert_cycle(cycle).await?;
    info!(
        "Recorded cycle {} ({} -> {}, {} days)",
        stored.id.map(|id| id.to_string()).unwrap_or_default(),
        stored.start,
        stored.end,
        stored.length()
    );
    Ok(stored)
}

/// All recorded cycles in history order.
pub async fn list_cycles<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Cycle>> {
    repo.list_cycles().await
}

/// Load the history used for estimation.
///
/// Same rows as [`list_cycles`]; kept separate so the prediction path logs
/// the history size it is working from.
pub async fn load_history<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Cycle>> {
    let history = repo.list_cycles().await?;
    debug!("Loaded cycle history ({} cycles)", history.len());
    Ok(history)
}

/// The most recent stored prediction, if any.
pub async fn latest_prediction<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<Option<Prediction>> {
    repo.latest_prediction().await
}

/// Validate and append a prediction to the log.
pub async fn store_prediction<R: FullRepository + ?Sized>(
    repo: &R,
    prediction: &Prediction,
) -> RepositoryResult<PredictionId> {
    prediction.validate()?;
    let id = repo.insert_prediction(prediction).await?;
    debug!(
        "Stored prediction {} (next_start={}, created_at={})",
        id, prediction.next_start, prediction.created_at
    );
    Ok(id)
}
