use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Invariant violations detected on a [`Prediction`] before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictionInvariantError {
    #[error("cycle_length must be positive, got {0}")]
    NonPositiveCycleLength(i32),

    #[error("period_length must be positive, got {0}")]
    NonPositivePeriodLength(i32),

    #[error("PMS window {pms_start}..{pms_end} is inverted")]
    InvertedPmsWindow {
        pms_start: NaiveDate,
        pms_end: NaiveDate,
    },

    #[error("PMS window must end before next_start ({pms_end} >= {next_start})")]
    PmsAfterOnset {
        pms_end: NaiveDate,
        next_start: NaiveDate,
    },
}

/// A predicted next cycle.
///
/// Serialized as a flat object; dates are `YYYY-MM-DD`, `created_at` is
/// RFC 3339 in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub cycle_length: i32,
    pub next_start: NaiveDate,
    pub pms_start: NaiveDate,
    pub pms_end: NaiveDate,
    pub period_length: i32,
}

impl Prediction {
    /// Check `pms_start <= pms_end < next_start` and positive lengths.
    pub fn validate(&self) -> Result<(), PredictionInvariantError> {
        if self.cycle_length <= 0 {
            return Err(PredictionInvariantError::NonPositiveCycleLength(
                self.cycle_length,
            ));
        }
        if self.period_length <= 0 {
            return Err(PredictionInvariantError::NonPositivePeriodLength(
                self.period_length,
            ));
        }
        if self.pms_start > self.pms_end {
            return Err(PredictionInvariantError::InvertedPmsWindow {
                pms_start: self.pms_start,
                pms_end: self.pms_end,
            });
        }
        if self.pms_end >= self.next_start {
            return Err(PredictionInvariantError::PmsAfterOnset {
                pms_end: self.pms_end,
                next_start: self.next_start,
            });
        }
        Ok(())
    }
}
