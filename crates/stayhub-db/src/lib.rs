//! # Stayhub Database
//!
//! Connection pooling and small sqlx helpers shared by the PostgreSQL stores.

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use stayhub_config::DbConfig;

/// Database connection pool type
pub type DbPool = Pool<Postgres>;

/// SQLSTATE raised when an EXCLUDE constraint rejects a row
const EXCLUSION_VIOLATION: &str = "23P01";

/// Create a PostgreSQL connection pool
pub async fn create_pool(database_url: &str, db_config: &DbConfig) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(
            db_config.acquire_timeout_secs,
        ))
        .idle_timeout(Some(std::time::Duration::from_secs(
            db_config.idle_timeout_secs,
        )))
        .test_before_acquire(true)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Round-trip to the database, used by readiness checks
pub async fn ping(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// True when the error is an exclusion-constraint violation
pub fn is_exclusion_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(EXCLUSION_VIOLATION),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_not_exclusion_violations() {
        assert!(!is_exclusion_violation(&sqlx::Error::RowNotFound));
        assert!(!is_exclusion_violation(&sqlx::Error::PoolTimedOut));
    }
}
