//! SQLite repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures (busy / locked database)
//! - Automatic migration execution
//!
//! Every connection handed out by the pool has `busy_timeout` and
//! `foreign_keys` set, so concurrent writers wait instead of failing
//! immediately.

use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sql_query;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::api::PredictionId;
use crate::db::repository::{
    CycleRepository, ErrorContext, PredictionRepository, RepositoryError, RepositoryResult,
};
use crate::models::cycle::Cycle;
use crate::models::prediction::Prediction;

mod models;
mod schema;

use models::*;
use schema::*;

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/sqlite/migrations");

diesel::define_sql_function! {
    fn last_insert_rowid() -> diesel::sql_types::BigInt;
}

/// Configuration for opening a SQLite database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    /// Path of the database file (created if missing)
    pub database_path: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Pool checkout timeout in seconds
    pub connection_timeout_sec: u64,
    /// How long SQLite waits on a locked database before reporting busy
    pub busy_timeout_ms: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            database_path: "cycles.db".to_string(),
            max_pool_size: 4,
            connection_timeout_sec: 30,
            busy_timeout_ms: 5000,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl SqliteConfig {
    /// Create a new configuration for a database file.
    pub fn with_path(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug)]
struct ConnectionOptions {
    busy_timeout_ms: u64,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;",
            self.busy_timeout_ms
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Diesel-backed repository for SQLite.
#[derive(Clone, Debug)]
pub struct SqliteRepository {
    pool: SqlitePool,
    config: SqliteConfig,
}

impl SqliteRepository {
    /// Open (or create) the database and run pending migrations.
    pub fn new(config: SqliteConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(&config.database_path);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .connection_customizer(Box::new(ConnectionOptions {
                busy_timeout_ms: config.busy_timeout_ms,
            }))
            .build(manager)
            .map_err(|e| {
                RepositoryError::unavailable(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("path={}", config.database_path)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::unavailable(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        log::info!(
            "SQLite repository ready at {} (pool_max={})",
            config.database_path,
            config.max_pool_size
        );

        Ok(Self { pool, config })
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    fn run_migrations(conn: &mut SqliteConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal(format!("Migration failed: {}", e))
                .with_operation("run_migrations")
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// Runs on the blocking pool; retries up to `max_retries` times with
    /// exponential backoff when the error is retryable.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    log::debug!(
                        "Retrying SQLite operation (attempt {}/{})",
                        attempt + 1,
                        max_retries + 1
                    );
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::unavailable(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal(format!("Task join error: {}", e))
                .with_operation("spawn_blocking")
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

#[async_trait]
impl CycleRepository for SqliteRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn insert_cycle(&self, cycle: &Cycle) -> RepositoryResult<Cycle> {
        cycle.validate()?;
        let cycle = cycle.clone();

        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                diesel::insert_into(cycles::table)
                    .values(NewCycleRow::from(&cycle))
                    .execute(tx)?;
                let id: i64 = diesel::select(last_insert_rowid()).get_result(tx)?;

                cycles::table
                    .find(id)
                    .select(CycleRow::as_select())
                    .first::<CycleRow>(tx)
            })
            .map_err(|e| map_diesel_error(e).with_operation("insert_cycle"))?
            .into_cycle()
        })
        .await
    }

    async fn list_cycles(&self) -> RepositoryResult<Vec<Cycle>> {
        self.with_conn(|conn| {
            let rows = cycles::table
                .order((cycles::start_date.asc(), cycles::id.asc()))
                .select(CycleRow::as_select())
                .load::<CycleRow>(conn)
                .map_err(|e| map_diesel_error(e).with_operation("list_cycles"))?;

            rows.into_iter().map(CycleRow::into_cycle).collect()
        })
        .await
    }
}

#[async_trait]
impl PredictionRepository for SqliteRepository {
    async fn insert_prediction(&self, prediction: &Prediction) -> RepositoryResult<PredictionId> {
        let prediction = prediction.clone();

        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                diesel::insert_into(predictions::table)
                    .values(NewPredictionRow::from(&prediction))
                    .execute(tx)?;
                diesel::select(last_insert_rowid()).get_result::<i64>(tx)
            })
            .map(PredictionId)
            .map_err(|e| map_diesel_error(e).with_operation("insert_prediction"))
        })
        .await
    }

    async fn latest_prediction(&self) -> RepositoryResult<Option<Prediction>> {
        self.with_conn(|conn| {
            let row = predictions::table
                .order((predictions::created_at.desc(), predictions::id.desc()))
                .select(PredictionRow::as_select())
                .first::<PredictionRow>(conn)
                .optional()
                .map_err(|e| map_diesel_error(e).with_operation("latest_prediction"))?;

            row.map(PredictionRow::into_prediction).transpose()
        })
        .await
    }
}
