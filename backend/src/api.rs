//! Public API surface for the Rust backend.
//!
//! This file consolidates the domain types exchanged over the HTTP API.
//! All types derive Serialize/Deserialize for JSON serialization.

pub use crate::models::cycle::{Cycle, CycleValidationError};
pub use crate::models::prediction::{Prediction, PredictionInvariantError};
pub use crate::services::calendar::{CalendarEvent, PeriodSpan};
pub use crate::services::estimator::{Forecast, HistoryStats};

use serde::{Deserialize, Serialize};

/// Cycle identifier (database primary key).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CycleId(pub i64);

/// Prediction row identifier (database primary key).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PredictionId(pub i64);

impl CycleId {
    pub fn new(value: i64) -> Self {
        CycleId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl PredictionId {
    pub fn new(value: i64) -> Self {
        PredictionId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CycleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for PredictionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CycleId> for i64 {
    fn from(id: CycleId) -> Self {
        id.0
    }
}

impl From<PredictionId> for i64 {
    fn from(id: PredictionId) -> Self {
        id.0
    }
}
