//! Data Transfer Objects for the HTTP API.
//!
//! Predictions are returned as the domain [`Prediction`] type directly; it
//! already serializes to the flat wire format.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use crate::api::{CalendarEvent, Prediction};
use crate::models::cycle::{check_date_range, Cycle, CycleValidationError};
use crate::models::time::parse_iso_date;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Crate version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Cycle as returned by the API, with its derived length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleDto {
    pub id: Option<i64>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub notes: Option<String>,
    /// `end - start` in days
    pub length: i64,
}

impl From<Cycle> for CycleDto {
    fn from(cycle: Cycle) -> Self {
        Self {
            id: cycle.id.map(i64::from),
            start: cycle.start,
            end: cycle.end,
            length: cycle.length(),
            notes: cycle.notes,
        }
    }
}

/// Cycle list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleListResponse {
    pub cycles: Vec<CycleDto>,
    pub total: usize,
}

/// Request body for recording a cycle.
///
/// Dates are accepted as strings so missing and malformed values can be
/// reported individually.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCycleRequest {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn required_date(field: &'static str, value: Option<&str>) -> Result<NaiveDate, CycleValidationError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(CycleValidationError::MissingField(field))?;
    let invalid = || CycleValidationError::InvalidDate {
        field,
        value: raw.to_string(),
    };
    let date = parse_iso_date(raw).map_err(|_| invalid())?;
    check_date_range(date).map_err(|_| invalid())
}

impl TryFrom<CreateCycleRequest> for Cycle {
    type Error = CycleValidationError;

    fn try_from(request: CreateCycleRequest) -> Result<Self, Self::Error> {
        let start = required_date("start", request.start.as_deref())?;
        let end = required_date("end", request.end.as_deref())?;
        Cycle::new(start, end, request.notes)
    }
}

/// Calendar view: one event per day, plus the prediction it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub events: BTreeMap<NaiveDate, CalendarEvent>,
    pub prediction: Prediction,
}
