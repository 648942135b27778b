//! Prediction service: cache lookup, estimation and best-effort narration.
//!
//! ```text
//! current()
//!   ├─ cache hit  ──────────────────────────────► stored Prediction
//!   └─ cache miss ─► load history ─► estimator ─► narrator (timeout, fallback)
//!                                              └► store ─► new Prediction
//! ```

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;

use super::cache::PredictionCache;
use super::estimator::{self, Forecast};
use super::narrative::{fallback_text, NarrativeError, NarrativeGenerator};
use crate::config::AppConfig;
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::db::services;
use crate::models::cycle::Cycle;
use crate::models::prediction::Prediction;
use crate::models::time::{to_storage_precision, Clock};

/// Where a returned prediction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    Cached,
    Computed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentPrediction {
    pub prediction: Prediction,
    pub source: PredictionSource,
}

pub struct PredictionService {
    repository: Arc<dyn FullRepository>,
    cache: PredictionCache,
    narrator: Arc<dyn NarrativeGenerator>,
    clock: Arc<dyn Clock>,
    narrative_timeout: Duration,
}

impl PredictionService {
    pub fn new(
        repository: Arc<dyn FullRepository>,
        narrator: Arc<dyn NarrativeGenerator>,
        clock: Arc<dyn Clock>,
        stale_threshold_hours: i64,
        narrative_timeout: Duration,
    ) -> Self {
        let cache = PredictionCache::new(repository.clone(), clock.clone(), stale_threshold_hours);
        Self {
            repository,
            cache,
            narrator,
            clock,
            narrative_timeout,
        }
    }

    /// Build the service from the resolved application configuration.
    pub fn from_config(
        config: &AppConfig,
        repository: Arc<dyn FullRepository>,
        narrator: Arc<dyn NarrativeGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            repository,
            narrator,
            clock,
            config.prediction.stale_threshold_hours,
            Duration::from_secs(config.narrative.timeout_secs),
        )
    }

    pub fn cache(&self) -> &PredictionCache {
        &self.cache
    }

    /// Return the cached prediction if fresh, otherwise compute, store and
    /// return a new one.
    ///
    /// Storage failures propagate; narrative failures never do.
    pub async fn current(&self) -> RepositoryResult<CurrentPrediction> {
        if let Some(prediction) = self.cache.latest_fresh().await? {
            debug!("Serving cached prediction from {}", prediction.created_at);
            return Ok(CurrentPrediction {
                prediction,
                source: PredictionSource::Cached,
            });
        }

        let prediction = self.refresh().await?;
        Ok(CurrentPrediction {
            prediction,
            source: PredictionSource::Computed,
        })
    }

    /// Unconditionally recompute from the stored history and append the
    /// result to the log.
    pub async fn refresh(&self) -> RepositoryResult<Prediction> {
        let history = services::load_history(self.repository.as_ref()).await?;
        let prediction = self.generate(&history).await;
        self.cache.store(&prediction).await?;

        info!(
            "Computed prediction from {} cycles: next_start={}, cycle_length={}",
            history.len(),
            prediction.next_start,
            prediction.cycle_length
        );
        Ok(prediction)
    }

    /// Build a prediction for `history` (ascending by start) without storing it.
    pub async fn generate(&self, history: &[Cycle]) -> Prediction {
        let forecast = estimator::compute(history, self.clock.today());
        let text = self.narrate(history, &forecast).await;

        Prediction {
            text,
            created_at: to_storage_precision(self.clock.now()),
            cycle_length: forecast.cycle_length,
            next_start: forecast.next_start,
            pms_start: forecast.pms_start,
            pms_end: forecast.pms_end,
            period_length: forecast.period_length,
        }
    }

    async fn narrate(&self, history: &[Cycle], forecast: &Forecast) -> String {
        let summary = estimator::summarize_history(history);

        let result =
            match tokio::time::timeout(self.narrative_timeout, self.narrator.describe(&summary))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(NarrativeError::Timeout(self.narrative_timeout)),
            };

        match result {
            Ok(text) => text,
            Err(e) => {
                warn!("Narrative generation failed, using fallback: {}", e);
                fallback_text(history.is_empty(), forecast)
            }
        }
    }
}
