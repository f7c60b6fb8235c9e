//! Session repository - bearer tokens issued at login

use chrono::Utc;
use sqlx::SqlitePool;

use super::DbError;
use crate::auth::new_session_token;

/// Session repository
pub struct SessionRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Start a session and return its token.
    pub async fn create(&self, email: &str) -> Result<String, DbError> {
        let token = new_session_token();
        sqlx::query("INSERT INTO Sessions (token, email, created_at) VALUES (?, ?, ?)")
            .bind(&token)
            .bind(email)
            .bind(Utc::now().to_rfc3339())
            .execute(self.pool)
            .await?;
        Ok(token)
    }

    /// Email of the account holding this token.
    pub async fn email_for(&self, token: &str) -> Result<Option<String>, DbError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT email FROM Sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(|(email,)| email))
    }

    /// End a session. Returns whether it existed.
    pub async fn delete(&self, token: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM Sessions WHERE token = ?")
            .bind(token)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{open_in_memory, NewStudent, UserRepo};

    #[tokio::test]
    async fn token_lifecycle() {
        let pool = open_in_memory().await.unwrap();
        UserRepo::new(&pool)
            .create_student(&NewStudent {
                email: "s@x.edu".into(),
                password_hash: "h".into(),
                name: "S".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let repo = SessionRepo::new(&pool);
        let token = repo.create("s@x.edu").await.unwrap();
        assert_eq!(repo.email_for(&token).await.unwrap().as_deref(), Some("s@x.edu"));

        assert!(repo.delete(&token).await.unwrap());
        assert!(repo.email_for(&token).await.unwrap().is_none());
        assert!(!repo.delete(&token).await.unwrap());
    }
}
