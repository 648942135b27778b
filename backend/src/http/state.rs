//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::services::predictor::PredictionService;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Cached/computed prediction access
    pub predictor: Arc<PredictionService>,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>, predictor: Arc<PredictionService>) -> Self {
        Self {
            repository,
            predictor,
        }
    }
}
