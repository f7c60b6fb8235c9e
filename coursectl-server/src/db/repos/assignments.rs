//! Assignment repository
//!
//! Homework and exams share one implementation keyed by [`AssignmentKind`].
//! Creating an assignment back-fills a null grade for every student already
//! enrolled in the section, in the same transaction.

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use super::DbError;
use crate::db::begin_write;
use crate::models::{AssignmentKind, Content};

/// Homework or exam record
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Assignment {
    pub course_id: String,
    pub sec_no: i64,
    pub number: i64,
    pub details: Option<String>,
}

/// Result of creating an assignment
#[derive(Debug, Clone, Serialize)]
pub struct NewAssignment {
    #[serde(flatten)]
    pub assignment: Assignment,
    /// Null-grade rows created for enrolled students
    pub grade_rows: u64,
}

/// Assignment repository
pub struct AssignmentRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AssignmentRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the next-numbered assignment in a section (atomic).
    ///
    /// Numbers continue from the section's highest, starting at 1.
    pub async fn add(
        &self,
        kind: AssignmentKind,
        course_id: &str,
        sec_no: i64,
        details: &Content,
    ) -> Result<NewAssignment, DbError> {
        let mut tx = begin_write(self.pool).await?;

        let (sections,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM Sections WHERE course_id = ? AND sec_no = ?")
                .bind(course_id)
                .bind(sec_no)
                .fetch_one(&mut *tx)
                .await?;
        if sections == 0 {
            return Err(DbError::not_found("section", format!("{course_id}/{sec_no}")));
        }

        let next_sql = format!(
            "SELECT COALESCE(MAX({no}), 0) + 1 FROM {table} WHERE course_id = ? AND sec_no = ?",
            no = kind.number_column(),
            table = kind.table(),
        );
        let (number,): (i64,) = sqlx::query_as(&next_sql)
            .bind(course_id)
            .bind(sec_no)
            .fetch_one(&mut *tx)
            .await?;

        let insert_sql = format!(
            "INSERT INTO {table} (course_id, sec_no, {no}, {details}) VALUES (?, ?, ?, ?)",
            table = kind.table(),
            no = kind.number_column(),
            details = kind.details_column(),
        );
        sqlx::query(&insert_sql)
            .bind(course_id)
            .bind(sec_no)
            .bind(number)
            .bind(details.as_str())
            .execute(&mut *tx)
            .await?;

        let fan_out_sql = format!(
            "INSERT OR IGNORE INTO {grades} (student_email, course_id, sec_no, {no}, grade) \
             SELECT student_email, course_id, section_no, ?, NULL FROM Enrolls \
             WHERE course_id = ? AND section_no = ?",
            grades = kind.grades_table(),
            no = kind.number_column(),
        );
        let grade_rows = sqlx::query(&fan_out_sql)
            .bind(number)
            .bind(course_id)
            .bind(sec_no)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        tracing::info!(
            kind = kind.label(),
            course = course_id,
            section = sec_no,
            number,
            grade_rows,
            "assignment created"
        );

        Ok(NewAssignment {
            assignment: Assignment {
                course_id: course_id.to_owned(),
                sec_no,
                number,
                details: Some(details.as_str().to_owned()),
            },
            grade_rows,
        })
    }

    /// Assignments of one section, by number.
    pub async fn list_for_section(
        &self,
        kind: AssignmentKind,
        course_id: &str,
        sec_no: i64,
    ) -> Result<Vec<Assignment>, DbError> {
        let sql = format!(
            "SELECT course_id, sec_no, {no} AS number, {details} AS details FROM {table} \
             WHERE course_id = ? AND sec_no = ? ORDER BY {no}",
            no = kind.number_column(),
            details = kind.details_column(),
            table = kind.table(),
        );
        let assignments = sqlx::query_as(&sql)
            .bind(course_id)
            .bind(sec_no)
            .fetch_all(self.pool)
            .await?;
        Ok(assignments)
    }

    /// Assignments of every section of a course.
    pub async fn list_for_course(
        &self,
        kind: AssignmentKind,
        course_id: &str,
    ) -> Result<Vec<Assignment>, DbError> {
        let sql = format!(
            "SELECT course_id, sec_no, {no} AS number, {details} AS details FROM {table} \
             WHERE course_id = ? ORDER BY sec_no, {no}",
            no = kind.number_column(),
            details = kind.details_column(),
            table = kind.table(),
        );
        let assignments = sqlx::query_as(&sql)
            .bind(course_id)
            .fetch_all(self.pool)
            .await?;
        Ok(assignments)
    }
}
