//! Enrollment repository
//!
//! Reads go through [`EnrollmentRepo`]. The writes are free functions over a
//! connection because enrolling and dropping are decided and applied inside
//! one transaction by `rules`.

use serde::Serialize;
use sqlx::sqlite::SqliteExecutor;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use super::DbError;
use crate::models::AssignmentKind;

/// Enrollment record from database
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Enrollment {
    pub student_email: String,
    pub course_id: String,
    pub section_no: i64,
}

/// A course the student is enrolled in, with their section
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrolledCourse {
    pub course_id: String,
    pub course_name: String,
    pub course_desc: Option<String>,
    pub section_no: i64,
}

pub(crate) async fn find_enrollment<'c, E>(
    executor: E,
    email: &str,
    course_id: &str,
) -> Result<Option<Enrollment>, DbError>
where
    E: SqliteExecutor<'c>,
{
    let enrollment = sqlx::query_as(
        r#"
        SELECT student_email, course_id, section_no
        FROM Enrolls
        WHERE student_email = ? AND course_id = ?
        "#,
    )
    .bind(email)
    .bind(course_id)
    .fetch_optional(executor)
    .await?;
    Ok(enrollment)
}

/// Insert the enrollment and a null grade for every existing homework and
/// exam of the section. Returns the number of grade rows created.
pub(crate) async fn insert_enrollment(
    conn: &mut SqliteConnection,
    email: &str,
    course_id: &str,
    sec_no: i64,
) -> Result<u64, DbError> {
    sqlx::query("INSERT INTO Enrolls (student_email, course_id, section_no) VALUES (?, ?, ?)")
        .bind(email)
        .bind(course_id)
        .bind(sec_no)
        .execute(&mut *conn)
        .await
        .map_err(DbError::conflict_on("enrollment", format!("{email}/{course_id}")))?;

    let mut grade_rows = 0;
    for kind in AssignmentKind::ALL {
        let sql = format!(
            "INSERT OR IGNORE INTO {grades} (student_email, course_id, sec_no, {no}, grade) \
             SELECT ?, course_id, sec_no, {no}, NULL FROM {table} \
             WHERE course_id = ? AND sec_no = ?",
            grades = kind.grades_table(),
            no = kind.number_column(),
            table = kind.table(),
        );
        grade_rows += sqlx::query(&sql)
            .bind(email)
            .bind(course_id)
            .bind(sec_no)
            .execute(&mut *conn)
            .await?
            .rows_affected();
    }

    Ok(grade_rows)
}

/// Remove an enrollment; its grade rows go with it by cascade.
pub(crate) async fn delete_enrollment<'c, E>(
    executor: E,
    email: &str,
    course_id: &str,
) -> Result<u64, DbError>
where
    E: SqliteExecutor<'c>,
{
    let result = sqlx::query("DELETE FROM Enrolls WHERE student_email = ? AND course_id = ?")
        .bind(email)
        .bind(course_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Enrollment repository
pub struct EnrollmentRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EnrollmentRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, email: &str, course_id: &str) -> Result<Option<Enrollment>, DbError> {
        find_enrollment(self.pool, email, course_id).await
    }

    pub async fn is_enrolled(&self, email: &str, course_id: &str) -> Result<bool, DbError> {
        Ok(self.find(email, course_id).await?.is_some())
    }

    pub async fn enrolled_courses(&self, email: &str) -> Result<Vec<EnrolledCourse>, DbError> {
        let courses = sqlx::query_as(
            r#"
            SELECT c.course_id, c.course_name, c.course_desc, e.section_no
            FROM Enrolls e
            JOIN Courses c ON c.course_id = e.course_id
            WHERE e.student_email = ?
            ORDER BY c.course_id
            "#,
        )
        .bind(email)
        .fetch_all(self.pool)
        .await?;
        Ok(courses)
    }
}
