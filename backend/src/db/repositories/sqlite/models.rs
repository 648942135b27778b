use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use super::schema::{cycles, predictions};
use crate::api::CycleId;
use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::cycle::Cycle;
use crate::models::prediction::Prediction;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cycles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CycleRow {
    pub id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
}

impl CycleRow {
    pub fn into_cycle(self) -> RepositoryResult<Cycle> {
        Ok(Cycle::new(self.start_date, self.end_date, self.notes)?.with_id(CycleId(self.id)))
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cycles)]
pub struct NewCycleRow<'a> {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<&'a str>,
}

impl<'a> From<&'a Cycle> for NewCycleRow<'a> {
    fn from(cycle: &'a Cycle) -> Self {
        Self {
            start_date: cycle.start,
            end_date: cycle.end,
            notes: cycle.notes.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = predictions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PredictionRow {
    pub id: i64,
    pub text: String,
    pub created_at: NaiveDateTime,
    pub cycle_length: i32,
    pub next_start: NaiveDate,
    pub pms_start: NaiveDate,
    pub pms_end: NaiveDate,
    pub period_length: i32,
}

impl PredictionRow {
    pub fn into_prediction(self) -> RepositoryResult<Prediction> {
        let id = self.id;
        let prediction = Prediction {
            text: self.text,
            created_at: self.created_at.and_utc(),
            cycle_length: self.cycle_length,
            next_start: self.next_start,
            pms_start: self.pms_start,
            pms_end: self.pms_end,
            period_length: self.period_length,
        };
        prediction.validate().map_err(|e| {
            RepositoryError::internal(format!("stored prediction {} is invalid: {}", id, e))
        })?;
        Ok(prediction)
    }
}

/// Timestamps are stored as naive UTC.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = predictions)]
pub struct NewPredictionRow<'a> {
    pub text: &'a str,
    pub created_at: NaiveDateTime,
    pub cycle_length: i32,
    pub next_start: NaiveDate,
    pub pms_start: NaiveDate,
    pub pms_end: NaiveDate,
    pub period_length: i32,
}

impl<'a> From<&'a Prediction> for NewPredictionRow<'a> {
    fn from(p: &'a Prediction) -> Self {
        Self {
            text: &p.text,
            created_at: p.created_at.naive_utc(),
            cycle_length: p.cycle_length,
            next_start: p.next_start,
            pms_start: p.pms_start,
            pms_end: p.pms_end,
            period_length: p.period_length,
        }
    }
}
