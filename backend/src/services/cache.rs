//! Time-boxed prediction cache.
//!
//! The cache is the prediction log itself: the newest stored row is served
//! until it is older than the staleness threshold. There is no explicit
//! invalidation and no in-process state beyond the repository handle.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::api::PredictionId;
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::db::services;
use crate::models::prediction::Prediction;
use crate::models::time::Clock;

/// Default staleness threshold in hours.
pub const DEFAULT_STALE_THRESHOLD_HOURS: i64 = 24;

/// Largest accepted staleness threshold (one hundred years).
pub const MAX_STALE_THRESHOLD_HOURS: i64 = 100 * 366 * 24;

/// Whether a prediction created at `created_at` is stale at `now`.
///
/// Stale only when strictly more than `threshold_hours` have elapsed; a
/// `created_at` in the future counts as fresh, and so does any prediction
/// when the threshold is too large to represent.
pub fn is_stale(created_at: DateTime<Utc>, now: DateTime<Utc>, threshold_hours: i64) -> bool {
    match TimeDelta::try_hours(threshold_hours) {
        Some(threshold) => now - created_at > threshold,
        None => false,
    }
}

pub struct PredictionCache {
    repository: Arc<dyn FullRepository>,
    clock: Arc<dyn Clock>,
    stale_threshold_hours: i64,
}

impl PredictionCache {
    pub fn new(
        repository: Arc<dyn FullRepository>,
        clock: Arc<dyn Clock>,
        stale_threshold_hours: i64,
    ) -> Self {
        Self {
            repository,
            clock,
            stale_threshold_hours,
        }
    }

    pub fn stale_threshold_hours(&self) -> i64 {
        self.stale_threshold_hours
    }

    /// Most recent prediction if it is no older than `threshold_hours`.
    pub async fn get_latest(&self, threshold_hours: i64) -> RepositoryResult<Option<Prediction>> {
        let Some(latest) = services::latest_prediction(self.repository.as_ref()).await? else {
            log::debug!("Prediction cache empty");
            return Ok(None);
        };

        let now = self.clock.now();
        if is_stale(latest.created_at, now, threshold_hours) {
            log::debug!(
                "Cached prediction from {} is stale at {} (threshold {}h)",
                latest.created_at,
                now,
                threshold_hours
            );
            return Ok(None);
        }

        Ok(Some(latest))
    }

    /// [`get_latest`](Self::get_latest) with the configured threshold.
    pub async fn latest_fresh(&self) -> RepositoryResult<Option<Prediction>> {
        self.get_latest(self.stale_threshold_hours).await
    }

    /// Append a prediction. Invalid predictions are rejected before writing.
    pub async fn store(&self, prediction: &Prediction) -> RepositoryResult<PredictionId> {
        services::store_prediction(self.repository.as_ref(), prediction).await
    }
}
