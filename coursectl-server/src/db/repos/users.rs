//! User repository
//!
//! Accounts, the student/professor profile tables, zipcodes and departments.

use serde::Serialize;
use sqlx::sqlite::SqliteExecutor;
use sqlx::{FromRow, SqlitePool};

use super::DbError;
use crate::db::begin_write;
use crate::models::UserRole;

/// User record, without the password digest
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub email: String,
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
}

/// Student profile joined with its zipcode
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentProfile {
    pub phone: Option<String>,
    pub major: Option<String>,
    pub zipcode: Option<i64>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Professor profile joined with its department
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProfessorProfile {
    pub office_address: Option<String>,
    pub department: Option<String>,
    pub department_name: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub major: Option<String>,
    pub zipcode: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct NewProfessor {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub office_address: Option<String>,
    pub department: Option<String>,
    pub title: Option<String>,
}

/// Resolve an account's role with one query; a student row wins.
pub(crate) async fn role_of<'c, E>(executor: E, email: &str) -> Result<UserRole, DbError>
where
    E: SqliteExecutor<'c>,
{
    let (tag,): (Option<String>,) = sqlx::query_as(
        r#"
        SELECT CASE
            WHEN EXISTS (SELECT 1 FROM Students WHERE email = ?) THEN 'student'
            WHEN EXISTS (SELECT 1 FROM Professors WHERE email = ?) THEN 'professor'
        END
        "#,
    )
    .bind(email)
    .bind(email)
    .fetch_one(executor)
    .await?;

    Ok(UserRole::from_tag(tag.as_deref()))
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the User and Students rows together.
    pub async fn create_student(&self, student: &NewStudent) -> Result<(), DbError> {
        let mut tx = begin_write(self.pool).await?;

        sqlx::query("INSERT INTO User (email, password_hashed, name, age, gender) VALUES (?, ?, ?, ?, ?)")
            .bind(&student.email)
            .bind(&student.password_hash)
            .bind(&student.name)
            .bind(student.age)
            .bind(&student.gender)
            .execute(&mut *tx)
            .await
            .map_err(DbError::conflict_on("user", &student.email))?;

        sqlx::query("INSERT INTO Students (email, phone, major, zipcode) VALUES (?, ?, ?, ?)")
            .bind(&student.email)
            .bind(&student.phone)
            .bind(&student.major)
            .bind(student.zipcode)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Create the User and Professors rows together.
    pub async fn create_professor(&self, professor: &NewProfessor) -> Result<(), DbError> {
        let mut tx = begin_write(self.pool).await?;

        sqlx::query("INSERT INTO User (email, password_hashed, name, age, gender) VALUES (?, ?, ?, ?, ?)")
            .bind(&professor.email)
            .bind(&professor.password_hash)
            .bind(&professor.name)
            .bind(professor.age)
            .bind(&professor.gender)
            .execute(&mut *tx)
            .await
            .map_err(DbError::conflict_on("user", &professor.email))?;

        sqlx::query(
            "INSERT INTO Professors (email, office_address, department, title) VALUES (?, ?, ?, ?)",
        )
        .bind(&professor.email)
        .bind(&professor.office_address)
        .bind(&professor.department)
        .bind(&professor.title)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn upsert_zipcode(
        &self,
        zipcode: i64,
        city: Option<&str>,
        state: Option<&str>,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO Zipcodes (zipcode, city, state) VALUES (?, ?, ?)
            ON CONFLICT (zipcode) DO UPDATE SET city = excluded.city, state = excluded.state
            "#,
        )
        .bind(zipcode)
        .bind(city)
        .bind(state)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, email: &str) -> Result<User, DbError> {
        sqlx::query_as("SELECT email, name, age, gender FROM User WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", email))
    }

    /// Stored password digest, if the account exists.
    pub async fn password_hash(&self, email: &str) -> Result<Option<String>, DbError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT password_hashed FROM User WHERE email = ?")
                .bind(email)
                .fetch_optional(self.pool)
                .await?;
        Ok(row.map(|(hash,)| hash))
    }

    pub async fn update_password(&self, email: &str, password_hash: &str) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE User SET password_hashed = ? WHERE email = ?")
            .bind(password_hash)
            .bind(email)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", email));
        }
        Ok(())
    }

    pub async fn resolve_role(&self, email: &str) -> Result<UserRole, DbError> {
        role_of(self.pool, email).await
    }

    pub async fn student_profile(&self, email: &str) -> Result<Option<StudentProfile>, DbError> {
        let profile = sqlx::query_as(
            r#"
            SELECT s.phone, s.major, s.zipcode, z.city, z.state
            FROM Students s
            LEFT JOIN Zipcodes z ON z.zipcode = s.zipcode
            WHERE s.email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn professor_profile(
        &self,
        email: &str,
    ) -> Result<Option<ProfessorProfile>, DbError> {
        let profile = sqlx::query_as(
            r#"
            SELECT p.office_address, p.department, d.dept_name AS department_name, p.title
            FROM Professors p
            LEFT JOIN Departments d ON d.dept_id = p.department
            WHERE p.email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn student(email: &str) -> NewStudent {
        NewStudent {
            email: email.into(),
            password_hash: "digest".into(),
            name: "Avery Stone".into(),
            major: Some("Physics".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn student_profile_joins_zipcode() {
        let pool = open_in_memory().await.unwrap();
        let repo = UserRepo::new(&pool);
        repo.upsert_zipcode(16801, Some("State College"), Some("PA"))
            .await
            .unwrap();
        let new = NewStudent {
            zipcode: Some(16801),
            ..student("as@lionstate.edu")
        };
        repo.create_student(&new).await.unwrap();

        let profile = repo
            .student_profile("as@lionstate.edu")
            .await
            .unwrap()
            .expect("profile exists");
        assert_eq!(profile.city.as_deref(), Some("State College"));
        assert_eq!(profile.major.as_deref(), Some("Physics"));
        assert_eq!(repo.resolve_role("as@lionstate.edu").await.unwrap(), UserRole::Student);
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let pool = open_in_memory().await.unwrap();
        let repo = UserRepo::new(&pool);
        repo.create_student(&student("dup@lionstate.edu")).await.unwrap();

        let err = repo.create_student(&student("dup@lionstate.edu")).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { resource: "user", .. }));
    }

    #[tokio::test]
    async fn unknown_email_resolves_unknown() {
        let pool = open_in_memory().await.unwrap();
        let repo = UserRepo::new(&pool);
        assert_eq!(repo.resolve_role("nobody@x.edu").await.unwrap(), UserRole::Unknown);
        assert!(repo.password_hash("nobody@x.edu").await.unwrap().is_none());
        assert!(matches!(
            repo.update_password("nobody@x.edu", "h").await,
            Err(DbError::NotFound { .. })
        ));
    }
}
