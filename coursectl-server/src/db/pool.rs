//! SQLite connection pool management

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{
    Sqlite, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
    SqliteSynchronous,
};
use sqlx::Transaction;

/// Default maximum connections for the pool.
/// SQLite serialises writers, so a handful is plenty.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Create a pool for a database file, creating the file if missing.
///
/// Accepts either a `sqlite://` URL or a bare filesystem path.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("sqlite://coursectl.db").await?;
/// ```
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Create a pool with a custom connection limit.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_owned()
    } else {
        format!("sqlite://{}", database_url)
    };

    let options = SqliteConnectOptions::from_str(&url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Begin a transaction that takes the database write lock up front.
///
/// Use for every transaction that reads before it writes. A deferred
/// transaction in WAL mode cannot upgrade from reader to writer once another
/// connection has committed, and fails with `SQLITE_BUSY_SNAPSHOT` without
/// waiting; `BEGIN IMMEDIATE` waits on the busy timeout instead.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Open a private in-memory database with the schema applied.
///
/// Every connection to `:memory:` is a separate database, so the pool is
/// pinned to a single connection that is never recycled.
pub async fn open_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    super::schema::apply(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_pool_has_schema() {
        let pool = open_in_memory().await.expect("pool creation failed");

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'Enrolls'",
        )
        .fetch_one(&pool)
        .await
        .expect("query failed");

        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn file_pool_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.db");

        let pool = create_pool(path.to_str().unwrap()).await.expect("pool creation failed");
        crate::db::schema::apply(&pool).await.expect("schema failed");

        let (one,): (i64,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await.unwrap();
        assert_eq!(one, 1);
        assert!(path.exists());
    }
}
