use chrono::{DateTime, NaiveDate, SubsecRound, TimeDelta, Utc};
use parking_lot::Mutex;

/// Source of wall-clock time for staleness checks and empty-history anchoring.
///
/// All times are UTC. Implementations must be cheap to call; the prediction
/// service asks for `now()` on every request.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date in UTC.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock to an absolute instant.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    /// Move the clock forward (or backward, for negative deltas).
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock();
        *now += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Timestamp precision used for persisted predictions.
pub fn to_storage_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// Parse an ISO-8601 calendar date (`YYYY-MM-DD`).
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
}
