//! Schema creation

use sqlx::SqlitePool;

const SCHEMA: &str = include_str!("schema.sql");

/// Create all tables and indexes that do not exist yet.
pub async fn apply(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    tracing::debug!("applying coursectl schema");
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::db::open_in_memory;

    #[tokio::test]
    async fn apply_is_idempotent() {
        let pool = open_in_memory().await.unwrap();
        super::apply(&pool).await.expect("second apply should be a no-op");

        let (tables,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(tables, 18);
    }
}
