#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use cycle_predictor::api::Cycle;
use cycle_predictor::db::repositories::LocalRepository;
use cycle_predictor::models::time::FixedClock;
use cycle_predictor::services::{NarrativeError, NarrativeGenerator, PredictionService};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to process-global env
/// vars so parallel tests don't observe each other's changes.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn instant(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn cycle(start: NaiveDate, end: NaiveDate, notes: Option<&str>) -> Cycle {
    Cycle::new(start, end, notes.map(str::to_string)).unwrap()
}

/// Returns a fixed text and counts calls.
pub struct ScriptedNarrator {
    text: String,
    calls: Mutex<usize>,
}

impl ScriptedNarrator {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl NarrativeGenerator for ScriptedNarrator {
    async fn describe(&self, _summary: &str) -> Result<String, NarrativeError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.text.clone())
    }
}

/// Always fails.
pub struct BrokenNarrator;

#[async_trait]
impl NarrativeGenerator for BrokenNarrator {
    async fn describe(&self, _summary: &str) -> Result<String, NarrativeError> {
        Err(NarrativeError::Api {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

pub struct Harness {
    pub repo: LocalRepository,
    pub clock: Arc<FixedClock>,
    pub service: Arc<PredictionService>,
}

/// Prediction service over an in-memory repository and a fixed clock.
pub fn harness(narrator: Arc<dyn NarrativeGenerator>, now: DateTime<Utc>) -> Harness {
    let repo = LocalRepository::new();
    let clock = Arc::new(FixedClock::new(now));
    let service = Arc::new(PredictionService::new(
        Arc::new(repo.clone()),
        narrator,
        clock.clone(),
        24,
        Duration::from_secs(2),
    ));
    Harness {
        repo,
        clock,
        service,
    }
}
