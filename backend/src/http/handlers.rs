//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the service
//! layer for business logic.

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};

use super::dto::{
    CalendarResponse, CreateCycleRequest, CycleDto, CycleListResponse, HealthResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::cycle::Cycle;
use crate::models::prediction::Prediction;
use crate::services::calendar::{compute_events, spans_from_history};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Prediction
// =============================================================================

/// GET /api/prediction
///
/// Serves the cached prediction while fresh; otherwise recomputes from the
/// full history and stores the result.
pub async fn get_prediction(State(state): State<AppState>) -> HandlerResult<Prediction> {
    let current = state.predictor.current().await?;
    tracing::debug!(source = ?current.source, "prediction served");
    Ok(Json(current.prediction))
}

// =============================================================================
// Cycles
// =============================================================================

/// GET /api/cycles
pub async fn list_cycles(State(state): State<AppState>) -> HandlerResult<CycleListResponse> {
    let cycles = db_services::list_cycles(state.repository.as_ref()).await?;

    let cycles: Vec<CycleDto> = cycles.into_iter().map(Into::into).collect();
    let total = cycles.len();

    Ok(Json(CycleListResponse { cycles, total }))
}

/// POST /api/cycles
///
/// Records a cycle. Does not touch the prediction cache.
pub async fn create_cycle(
    State(state): State<AppState>,
    payload: Result<Json<CreateCycleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CycleDto>), AppError> {
    let Json(request) = payload?;
    let cycle = Cycle::try_from(request)?;
    let stored = db_services::record_cycle(state.repository.as_ref(), &cycle).await?;

    Ok((StatusCode::CREATED, Json(stored.into())))
}

// =============================================================================
// Calendar
// =============================================================================

/// GET /api/calendar
pub async fn get_calendar(State(state): State<AppState>) -> HandlerResult<CalendarResponse> {
    let history = db_services::list_cycles(state.repository.as_ref()).await?;
    let prediction = state.predictor.current().await?.prediction;
    let events = compute_events(&spans_from_history(&history), Some(&prediction));

    Ok(Json(CalendarResponse { events, prediction }))
}
