use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

/// Schema migrations embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite primary result code for "database is locked".
const SQLITE_BUSY: i32 = 5;

/// Creates the SQLite connection pool and brings the schema up to date.
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
    timeout: Duration,
) -> Result<SqlitePool> {
    info!("Opening SQLite database at {database_url}");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(timeout)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;

    info!("SQLite pool established, migrations applied");
    Ok(pool)
}

/// Errors raised by the persistence layer, shared by every repository.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Referenced record does not exist: {0}")]
    MissingReference(String),

    #[error("Storage operation timed out")]
    Timeout,

    #[error("Stored section could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::PoolTimedOut => StoreError::Timeout,
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    StoreError::Conflict(db_err.message().to_string())
                } else if db_err.is_foreign_key_violation() {
                    StoreError::MissingReference(db_err.message().to_string())
                } else if is_busy(db_err.code().as_deref()) {
                    StoreError::Timeout
                } else {
                    StoreError::Database(e)
                }
            }
            _ => StoreError::Database(e),
        }
    }
}

/// Extended SQLite codes carry the primary code in their low byte.
fn is_busy(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok())
        .map(|c| c & 0xff == SQLITE_BUSY)
        .unwrap_or(false)
}

#[cfg(test)]
pub mod test_support {
    use std::path::Path;

    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;

    use super::MIGRATOR;

    /// Single-connection pool over a fresh database file inside `dir`, migrations applied.
    pub async fn test_pool(dir: &Path) -> SqlitePool {
        let options = SqliteConnectOptions::new()
            .filename(dir.join("test.db"))
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create test pool");

        MIGRATOR
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        pool
    }

    /// Inserts a stub account so resumes have a valid owner.
    pub async fn insert_user(pool: &SqlitePool, email: &str) -> i64 {
        let now = chrono::Utc::now();
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (name, email, password_hash, created_at, updated_at) \
             VALUES (?, ?, 'not-a-hash', ?, ?) RETURNING id",
        )
        .bind("Test User")
        .bind(email)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .expect("Failed to create test user")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_busy_matches_primary_and_extended_codes() {
        assert!(is_busy(Some("5")));
        assert!(is_busy(Some("261"))); // SQLITE_BUSY_RECOVERY
        assert!(!is_busy(Some("2067")));
        assert!(!is_busy(None));
    }

    #[tokio::test]
    async fn test_duplicate_email_maps_to_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let pool = test_support::test_pool(dir.path()).await;
        test_support::insert_user(&pool, "dup@example.com").await;

        let now = chrono::Utc::now();
        let err = sqlx::query(
            "INSERT INTO users (name, email, password_hash, created_at, updated_at) \
             VALUES ('Other', 'dup@example.com', 'x', ?, ?)",
        )
        .bind(now)
        .bind(now)
        .execute(&pool)
        .await
        .unwrap_err();

        assert!(matches!(StoreError::from(err), StoreError::Conflict(_)));
    }
}
