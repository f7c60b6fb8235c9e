//! Grade repository
//!
//! Grade rows are created by enrollment and assignment fan-out; this module
//! reads, overwrites and aggregates them.

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use super::DbError;
use crate::models::AssignmentKind;

/// An assignment of the student's section with their grade, if entered
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct AssignmentGrade {
    pub number: i64,
    pub details: Option<String>,
    pub grade: Option<f64>,
}

/// One line of a professor's grade sheet
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct GradeSheetRow {
    pub student_email: String,
    pub name: Option<String>,
    pub grade: Option<f64>,
}

/// Grade repository
pub struct GradeRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> GradeRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Every assignment of the section, with this student's grade beside it.
    pub async fn student_grades(
        &self,
        kind: AssignmentKind,
        email: &str,
        course_id: &str,
        sec_no: i64,
    ) -> Result<Vec<AssignmentGrade>, DbError> {
        let sql = format!(
            "SELECT a.{no} AS number, a.{details} AS details, g.grade \
             FROM {table} a \
             LEFT JOIN {grades} g \
               ON g.course_id = a.course_id AND g.sec_no = a.sec_no \
              AND g.{no} = a.{no} AND g.student_email = ? \
             WHERE a.course_id = ? AND a.sec_no = ? \
             ORDER BY a.{no}",
            no = kind.number_column(),
            details = kind.details_column(),
            table = kind.table(),
            grades = kind.grades_table(),
        );
        let rows = sqlx::query_as(&sql)
            .bind(email)
            .bind(course_id)
            .bind(sec_no)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// All grade rows for one assignment, ordered by student.
    pub async fn grade_sheet(
        &self,
        kind: AssignmentKind,
        course_id: &str,
        sec_no: i64,
        number: i64,
    ) -> Result<Vec<GradeSheetRow>, DbError> {
        let sql = format!(
            "SELECT g.student_email, u.name, g.grade \
             FROM {grades} g \
             LEFT JOIN User u ON u.email = g.student_email \
             WHERE g.course_id = ? AND g.sec_no = ? AND g.{no} = ? \
             ORDER BY g.student_email",
            grades = kind.grades_table(),
            no = kind.number_column(),
        );
        let rows = sqlx::query_as(&sql)
            .bind(course_id)
            .bind(sec_no)
            .bind(number)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Overwrite one grade; `None` clears it.
    pub async fn set_grade(
        &self,
        kind: AssignmentKind,
        email: &str,
        course_id: &str,
        sec_no: i64,
        number: i64,
        grade: Option<f64>,
    ) -> Result<(), DbError> {
        let sql = format!(
            "UPDATE {grades} SET grade = ? \
             WHERE student_email = ? AND course_id = ? AND sec_no = ? AND {no} = ?",
            grades = kind.grades_table(),
            no = kind.number_column(),
        );
        let result = sqlx::query(&sql)
            .bind(grade)
            .bind(email)
            .bind(course_id)
            .bind(sec_no)
            .bind(number)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "grade",
                format!("{email}/{course_id}/{sec_no}/{}{number}", kind.label()),
            ));
        }

        tracing::debug!(kind = kind.label(), student = email, course = course_id, number, ?grade, "grade set");
        Ok(())
    }

    /// Mean of the student's entered grades of one kind in the course.
    pub async fn average(
        &self,
        kind: AssignmentKind,
        email: &str,
        course_id: &str,
    ) -> Result<Option<f64>, DbError> {
        let sql = format!(
            "SELECT AVG(grade) FROM {grades} WHERE student_email = ? AND course_id = ?",
            grades = kind.grades_table(),
        );
        let (avg,): (Option<f64>,) = sqlx::query_as(&sql)
            .bind(email)
            .bind(course_id)
            .fetch_one(self.pool)
            .await?;
        Ok(avg)
    }

    /// Sum and count of entered homework and exam grades in the course.
    pub async fn totals(&self, email: &str, course_id: &str) -> Result<(f64, i64), DbError> {
        let row: (f64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT TOTAL(grade) FROM Homework_Grades WHERE student_email = ? AND course_id = ?)
              + (SELECT TOTAL(grade) FROM Exam_Grades WHERE student_email = ? AND course_id = ?),
                (SELECT COUNT(grade) FROM Homework_Grades WHERE student_email = ? AND course_id = ?)
              + (SELECT COUNT(grade) FROM Exam_Grades WHERE student_email = ? AND course_id = ?)
            "#,
        )
        .bind(email)
        .bind(course_id)
        .bind(email)
        .bind(course_id)
        .bind(email)
        .bind(course_id)
        .bind(email)
        .bind(course_id)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }
}
