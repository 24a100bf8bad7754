//! Persistence gateway.
//!
//! Every public function in `users` and `tasks` takes the pool explicitly, opens
//! one transaction, and commits only on success. A transaction dropped on an
//! early return or an error is rolled back by `sqlx`, so a failed call never
//! leaves partial state behind.
//!
//! Expected outcomes are returned as values: `Option` for lookups and `bool`
//! for mutations, where `false` covers both "absent" and "not yours".

pub mod tasks;
pub mod users;

use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::{config::Config, error::AppError};

/// Migrations embedded from `./migrations` at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Builds the connection pool. Connections are opened on first use.
pub fn connect(config: &Config) -> Result<PgPool, AppError> {
    log::info!(
        "Creating database pool (max_connections = {})",
        config.max_db_connections
    );
    let pool = PgPoolOptions::new()
        .max_connections(config.max_db_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_lazy(&config.database_url)?;
    Ok(pool)
}

/// Pings the database until it answers, up to `retries` attempts.
pub async fn wait_for_db(pool: &PgPool, retries: u32) -> Result<(), AppError> {
    let attempts = retries.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await {
            Ok(_) => {
                log::info!("Database reachable after {} attempt(s)", attempt);
                return Ok(());
            }
            Err(e) => {
                log::warn!("Database not reachable (attempt {}/{}): {}", attempt, attempts, e);
                last_error = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }
    }

    Err(last_error
        .map(AppError::from)
        .unwrap_or_else(|| AppError::DatabaseError("Database not reachable".into())))
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    MIGRATOR.run(pool).await?;
    log::info!("Database migrations applied");
    Ok(())
}

/// True when `error` is a unique-constraint violation reported by Postgres.
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.is_unique_violation(),
        _ => false,
    }
}
