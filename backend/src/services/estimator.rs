//! Next-cycle estimator.
//!
//! Maps an ordered cycle history to a [`Forecast`]: the averaged cycle length,
//! the predicted onset, a fixed PMS window and a fixed period length. The
//! narrative text is filled in later by the prediction service.

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::models::cycle::Cycle;

/// Cycle length used when no history has been recorded.
pub const DEFAULT_CYCLE_LENGTH: i32 = 28;

/// Predicted period length. Not derived from recorded data.
pub const DEFAULT_PERIOD_LENGTH: i32 = 5;

/// PMS window opens this many days before the predicted onset.
pub const PMS_LEAD_DAYS: i64 = 7;

/// PMS window closes this many days before the predicted onset.
pub const PMS_TAIL_DAYS: i64 = 5;

/// Number of trailing cycles whose notes are quoted in the summary.
pub const RECENT_NOTES_WINDOW: usize = 3;

/// Estimator output: every prediction field except the narrative text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub cycle_length: i32,
    pub next_start: NaiveDate,
    pub pms_start: NaiveDate,
    pub pms_end: NaiveDate,
    pub period_length: i32,
}

/// Descriptive statistics over historical cycle lengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub count: usize,
    pub mean: f64,
    /// Population variance of the lengths.
    pub variance: f64,
}

impl HistoryStats {
    /// `None` for an empty history.
    pub fn from_history(history: &[Cycle]) -> Option<Self> {
        if history.is_empty() {
            return None;
        }

        let count = history.len();
        let lengths: Vec<f64> = history.iter().map(|c| c.length() as f64).collect();
        let mean = lengths.iter().sum::<f64>() / count as f64;
        let variance = if count > 1 {
            lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / count as f64
        } else {
            0.0
        };

        Some(Self {
            count,
            mean,
            variance,
        })
    }

    /// Mean length rounded half-to-even, never below one day.
    pub fn rounded_mean(&self) -> i32 {
        (self.mean.round_ties_even() as i32).max(1)
    }
}

/// Compute the next-cycle forecast.
///
/// `history` must be ordered by ascending `start`; its last element anchors
/// the prediction. `today` anchors an empty history.
pub fn compute(history: &[Cycle], today: NaiveDate) -> Forecast {
    let (cycle_length, anchor) = match (HistoryStats::from_history(history), history.last()) {
        (Some(stats), Some(last)) => (stats.rounded_mean(), last.start),
        _ => (DEFAULT_CYCLE_LENGTH, today),
    };

    let next_start = anchor + TimeDelta::days(i64::from(cycle_length));

    Forecast {
        cycle_length,
        next_start,
        pms_start: next_start - TimeDelta::days(PMS_LEAD_DAYS),
        pms_end: next_start - TimeDelta::days(PMS_TAIL_DAYS),
        period_length: DEFAULT_PERIOD_LENGTH,
    }
}

/// Render the history summary handed to the narrative generator.
pub fn summarize_history(history: &[Cycle]) -> String {
    let Some(stats) = HistoryStats::from_history(history) else {
        return "No cycle history provided.".to_string();
    };

    let recent = &history[history.len().saturating_sub(RECENT_NOTES_WINDOW)..];
    let notes: Vec<&str> = recent
        .iter()
        .filter_map(|c| c.notes.as_deref())
        .filter(|n| !n.is_empty())
        .collect();
    let notes = if notes.is_empty() {
        "None".to_string()
    } else {
        notes.join("; ")
    };

    format!(
        "Average cycle length: {:.1} days\nVariance: {:.2}\nRecent notes: {}",
        stats.mean, stats.variance, notes
    )
}

#[cfg(test)]
#[path = "estimator_tests.rs"]
mod estimator_tests;
