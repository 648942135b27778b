//! Calendar projection of recorded periods and the current prediction.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::models::cycle::Cycle;
use crate::models::prediction::Prediction;

/// What a calendar day represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalendarEvent {
    /// First recorded day of a period.
    Start,
    /// Subsequent recorded period day.
    Period,
    /// Predicted onset.
    PredictionStart,
    /// Predicted period day after onset.
    Prediction,
    Pms,
}

/// A recorded bleeding span. `end == None` marks a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSpan {
    pub start: NaiveDate,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl PeriodSpan {
    pub fn single_day(start: NaiveDate) -> Self {
        Self { start, end: None }
    }
}

/// Spans used for the calendar view: one single-day span per recorded cycle
/// start. Cycle `end` is the next onset, not the end of bleeding.
pub fn spans_from_history(history: &[Cycle]) -> Vec<PeriodSpan> {
    history
        .iter()
        .map(|c| PeriodSpan::single_day(c.start))
        .collect()
}

/// Map each relevant day to its event.
///
/// Recorded spans are applied first (later spans overwrite earlier ones on
/// shared days); predicted and PMS days only fill days that are still empty.
pub fn compute_events(
    spans: &[PeriodSpan],
    prediction: Option<&Prediction>,
) -> BTreeMap<NaiveDate, CalendarEvent> {
    let mut events = BTreeMap::new();

    for span in spans {
        let end = span.end.unwrap_or(span.start);
        for day in span.start.iter_days().take_while(|d| *d <= end) {
            let event = if day == span.start {
                CalendarEvent::Start
            } else {
                CalendarEvent::Period
            };
            events.insert(day, event);
        }
    }

    if let Some(p) = prediction {
        for offset in 0..i64::from(p.period_length.max(0)) {
            let day = p.next_start + TimeDelta::days(offset);
            let event = if offset == 0 {
                CalendarEvent::PredictionStart
            } else {
                CalendarEvent::Prediction
            };
            events.entry(day).or_insert(event);
        }

        for day in p.pms_start.iter_days().take_while(|d| *d <= p.pms_end) {
            events.entry(day).or_insert(CalendarEvent::Pms);
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn prediction(next: NaiveDate, pms_start: NaiveDate, pms_end: NaiveDate) -> Prediction {
        Prediction {
            text: String::new(),
            created_at: Utc::now(),
            cycle_length: 28,
            next_start: next,
            pms_start,
            pms_end,
            period_length: 5,
        }
    }

    #[test]
    fn test_recorded_span_marks_start_then_period() {
        let spans = [PeriodSpan {
            start: date(2024, 1, 1),
            end: Some(date(2024, 1, 3)),
        }];
        let events = compute_events(&spans, None);
        assert_eq!(events.len(), 3);
        assert_eq!(events[&date(2024, 1, 1)], CalendarEvent::Start);
        assert_eq!(events[&date(2024, 1, 2)], CalendarEvent::Period);
        assert_eq!(events[&date(2024, 1, 3)], CalendarEvent::Period);
    }

    #[test]
    fn test_prediction_days_and_pms_window() {
        let p = prediction(date(2024, 2, 1), date(2024, 1, 25), date(2024, 1, 27));
        let events = compute_events(&[], Some(&p));

        assert_eq!(events[&date(2024, 2, 1)], CalendarEvent::PredictionStart);
        assert_eq!(events[&date(2024, 2, 3)], CalendarEvent::Prediction);
        assert_eq!(events[&date(2024, 2, 5)], CalendarEvent::Prediction);
        assert!(!events.contains_key(&date(2024, 2, 6)));
        assert_eq!(events[&date(2024, 1, 26)], CalendarEvent::Pms);
        assert_eq!(events.len(), 8);
    }

    #[test]
    fn test_recorded_days_win_over_pms() {
        let spans = [PeriodSpan {
            start: date(2024, 1, 1),
            end: Some(date(2024, 1, 3)),
        }];
        let p = prediction(date(2024, 1, 9), date(2024, 1, 2), date(2024, 1, 4));
        let events = compute_events(&spans, Some(&p));

        assert_eq!(events[&date(2024, 1, 2)], CalendarEvent::Period);
        assert_eq!(events[&date(2024, 1, 3)], CalendarEvent::Period);
        assert_eq!(events[&date(2024, 1, 4)], CalendarEvent::Pms);
    }

    #[test]
    fn test_event_names_are_kebab_case() {
        assert_eq!(
            serde_json::to_value(CalendarEvent::PredictionStart).unwrap(),
            "prediction-start"
        );
        assert_eq!(serde_json::to_value(CalendarEvent::Pms).unwrap(), "pms");
    }

    #[test]
    fn test_spans_from_history_use_cycle_starts() {
        let history = vec![
            Cycle::new(date(2024, 1, 1), date(2024, 1, 29), None).unwrap(),
            Cycle::new(date(2024, 1, 29), date(2024, 2, 26), None).unwrap(),
        ];
        let events = compute_events(&spans_from_history(&history), None);
        assert_eq!(events.len(), 2);
        assert!(events.values().all(|e| *e == CalendarEvent::Start));
    }
}
