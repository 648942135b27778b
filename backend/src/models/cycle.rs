use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::api::CycleId;

/// Errors raised while building a [`Cycle`] from user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CycleValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} must be an ISO-8601 date (YYYY-MM-DD), got '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("end ({end}) must not be before start ({start})")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("{date} is outside the supported years 1-9999")]
    OutOfRange { date: NaiveDate },
}

/// Supported calendar years for recorded cycles.
pub const MIN_CYCLE_YEAR: i32 = 1;
pub const MAX_CYCLE_YEAR: i32 = 9999;

/// Reject dates whose year falls outside [`MIN_CYCLE_YEAR`]..=[`MAX_CYCLE_YEAR`].
pub fn check_date_range(date: NaiveDate) -> Result<NaiveDate, CycleValidationError> {
    if (MIN_CYCLE_YEAR..=MAX_CYCLE_YEAR).contains(&date.year()) {
        Ok(date)
    } else {
        Err(CycleValidationError::OutOfRange { date })
    }
}

/// A recorded cycle observation.
///
/// `end >= start` always holds for a constructed value; use [`Cycle::new`]
/// rather than building the struct by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CycleId>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Cycle {
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        notes: Option<String>,
    ) -> Result<Self, CycleValidationError> {
        let cycle = Self {
            id: None,
            start,
            end,
            notes: normalize_notes(notes),
        };
        cycle.validate()?;
        Ok(cycle)
    }

    /// Attach the storage-assigned id.
    pub fn with_id(mut self, id: CycleId) -> Self {
        self.id = Some(id);
        self
    }

    /// Cycle length in whole days (`end - start`).
    pub fn length(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Re-check the date invariants on a value that came from outside the
    /// constructor (deserialized rows, hand-built fixtures).
    pub fn validate(&self) -> Result<(), CycleValidationError> {
        check_date_range(self.start)?;
        check_date_range(self.end)?;
        if self.end < self.start {
            return Err(CycleValidationError::EndBeforeStart {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

/// Sort cycles into history order (ascending start, id as tie-breaker).
pub fn sort_history(cycles: &mut [Cycle]) {
    cycles.sort_by_key(|c| (c.start, c.id));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cycle_length_in_days() {
        let cycle = Cycle::new(date(2024, 1, 1), date(2024, 1, 29), None).unwrap();
        assert_eq!(cycle.length(), 28);
    }

    #[test]
    fn test_same_day_cycle_is_allowed() {
        let cycle = Cycle::new(date(2024, 3, 3), date(2024, 3, 3), None).unwrap();
        assert_eq!(cycle.length(), 0);
    }

    #[test]
    fn test_end_before_start_rejected() {
        let err = Cycle::new(date(2024, 1, 10), date(2024, 1, 9), None).unwrap_err();
        assert_eq!(
            err,
            CycleValidationError::EndBeforeStart {
                start: date(2024, 1, 10),
                end: date(2024, 1, 9),
            }
        );
        assert!(err.to_string().contains("must not be before"));
    }

    #[test]
    fn test_dates_beyond_year_9999_rejected() {
        let far = NaiveDate::from_ymd_opt(262_000, 1, 1).unwrap();
        let err = Cycle::new(date(2024, 1, 1), far, None).unwrap_err();
        assert_eq!(err, CycleValidationError::OutOfRange { date: far });

        let err = Cycle::new(far, far, None).unwrap_err();
        assert_eq!(err, CycleValidationError::OutOfRange { date: far });

        assert!(Cycle::new(date(9999, 12, 1), date(9999, 12, 31), None).is_ok());
    }

    #[test]
    fn test_validate_catches_hand_built_out_of_range_cycle() {
        let cycle = Cycle {
            id: None,
            start: NaiveDate::from_ymd_opt(-5, 1, 1).unwrap(),
            end: date(2024, 1, 1),
            notes: None,
        };
        assert!(matches!(
            cycle.validate(),
            Err(CycleValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_blank_notes_are_dropped() {
        let cycle = Cycle::new(date(2024, 1, 1), date(2024, 1, 28), Some("   ".into())).unwrap();
        assert_eq!(cycle.notes, None);

        let cycle = Cycle::new(date(2024, 1, 1), date(2024, 1, 28), Some(" cramps ".into())).unwrap();
        assert_eq!(cycle.notes.as_deref(), Some("cramps"));
    }

    #[test]
    fn test_sort_history_orders_by_start() {
        let mut cycles = vec![
            Cycle::new(date(2024, 3, 1), date(2024, 3, 29), None).unwrap(),
            Cycle::new(date(2024, 1, 1), date(2024, 1, 29), None).unwrap(),
            Cycle::new(date(2024, 2, 1), date(2024, 2, 28), None).unwrap(),
        ];
        sort_history(&mut cycles);
        let starts: Vec<_> = cycles.iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1)]);
    }

    #[test]
    fn test_validate_catches_hand_built_values() {
        let cycle = Cycle {
            id: None,
            start: date(2024, 5, 2),
            end: date(2024, 5, 1),
            notes: None,
        };
        assert!(cycle.validate().is_err());
    }
}
