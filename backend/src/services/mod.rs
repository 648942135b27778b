//! Service layer for business logic and orchestration.
//!
//! Services sit between the HTTP handlers and the repository layer:
//! the estimator and calendar projection are pure functions, the narrative
//! generator wraps the external language-model collaborator, and the
//! prediction service ties them together with the time-boxed cache.

pub mod cache;
pub mod calendar;
pub mod estimator;
pub mod narrative;
pub mod predictor;

pub use cache::{is_stale, PredictionCache, MAX_STALE_THRESHOLD_HOURS};
pub use calendar::{compute_events, spans_from_history, CalendarEvent, PeriodSpan};
pub use estimator::{compute, summarize_history, Forecast, HistoryStats};
pub use narrative::{NarrativeError, NarrativeGenerator, OpenAiNarrator};
pub use predictor::{CurrentPrediction, PredictionService, PredictionSource};
