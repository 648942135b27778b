//! Prediction log repository trait.
//!
//! Predictions are append-only; the most recent row doubles as the cache
//! consulted by the prediction service.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::PredictionId;
use crate::models::prediction::Prediction;

#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Append a prediction to the log.
    async fn insert_prediction(&self, prediction: &Prediction) -> RepositoryResult<PredictionId>;

    /// The prediction with the greatest `created_at`; ties go to the row
    /// inserted last. `None` when the log is empty.
    async fn latest_prediction(&self) -> RepositoryResult<Option<Prediction>>;
}
