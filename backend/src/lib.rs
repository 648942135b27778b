//! # Cycle Predictor
//!
//! Menstrual-cycle prediction backend.
//!
//! Records cycle history, estimates the next onset and PMS window from the
//! historical average, asks an external language model for narrative
//! commentary (falling back to deterministic text when it is unavailable),
//! and serves a time-boxed cached prediction over a small JSON API.
//!
//! ## Architecture
//!
//! - [`api`]: Public domain types and identifiers
//! - [`config`]: Process configuration (TOML file + environment overrides)
//! - [`models`]: Cycle and prediction types, clock abstraction
//! - [`db`]: Repository pattern, SQLite and in-memory backends
//! - [`services`]: Estimator, narrative generator, cache, prediction service, calendar
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
