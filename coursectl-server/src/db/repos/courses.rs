//! Course repository
//!
//! Courses, their sections, and the teaching-team tables that decide who
//! administers a course.

use serde::Serialize;
use sqlx::sqlite::SqliteExecutor;
use sqlx::{FromRow, Row, SqlitePool};

use super::DbError;
use crate::models::{DropDeadline, Page, Paginated};

/// Course record from database
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub course_id: String,
    pub course_name: String,
    pub course_desc: Option<String>,
    pub teaching_team_id: Option<i64>,
    pub late_drop_deadline: Option<String>,
}

impl Course {
    /// Parsed drop deadline. An unparseable stored value counts as none.
    pub fn drop_deadline(&self) -> Option<DropDeadline> {
        let raw = self.late_drop_deadline.as_deref()?;
        match DropDeadline::parse(raw) {
            Ok(deadline) => Some(deadline),
            Err(err) => {
                tracing::warn!(course = %self.course_id, value = raw, error = %err, "ignoring malformed drop deadline");
                None
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub course_id: String,
    pub course_name: String,
    pub course_desc: Option<String>,
    pub teaching_team_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct Section {
    pub sec_no: i64,
    pub max_limit: i64,
}

/// Section with its current enrollment, for the enroll page
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SectionWithCount {
    pub course_id: String,
    pub sec_no: i64,
    pub max_limit: i64,
    pub enrolled: i64,
}

/// Contact details of the professor teaching a course
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProfessorContact {
    pub email: String,
    pub name: String,
    pub office_address: Option<String>,
    pub department: Option<String>,
    pub title: Option<String>,
}

/// True iff one of the professor's teams is the course's team.
pub(crate) async fn is_prof_for_class<'c, E>(
    executor: E,
    email: &str,
    course_id: &str,
) -> Result<bool, DbError>
where
    E: SqliteExecutor<'c>,
{
    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM Courses c
        JOIN Prof_Teaching_Teams t ON t.teaching_team_id = c.teaching_team_id
        WHERE c.course_id = ? AND t.prof_email = ?
        "#,
    )
    .bind(course_id)
    .bind(email)
    .fetch_one(executor)
    .await?;
    Ok(count > 0)
}

/// True iff one of the student's TA teams is the course's team.
pub(crate) async fn is_ta_for_class<'c, E>(
    executor: E,
    email: &str,
    course_id: &str,
) -> Result<bool, DbError>
where
    E: SqliteExecutor<'c>,
{
    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM Courses c
        JOIN TA_Teaching_Teams t ON t.teaching_team_id = c.teaching_team_id
        WHERE c.course_id = ? AND t.student_email = ?
        "#,
    )
    .bind(course_id)
    .bind(email)
    .fetch_one(executor)
    .await?;
    Ok(count > 0)
}

/// Section capacity and current head count, or `None` for an unknown section.
pub(crate) async fn section_occupancy<'c, E>(
    executor: E,
    course_id: &str,
    sec_no: i64,
) -> Result<Option<(i64, i64)>, DbError>
where
    E: SqliteExecutor<'c>,
{
    let row: Option<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT s.max_limit, COUNT(e.student_email)
        FROM Sections s
        LEFT JOIN Enrolls e ON e.course_id = s.course_id AND e.section_no = s.sec_no
        WHERE s.course_id = ? AND s.sec_no = ?
        GROUP BY s.course_id, s.sec_no, s.max_limit
        "#,
    )
    .bind(course_id)
    .bind(sec_no)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

pub(crate) async fn find_course<'c, E>(executor: E, course_id: &str) -> Result<Course, DbError>
where
    E: SqliteExecutor<'c>,
{
    sqlx::query_as(
        r#"
        SELECT course_id, course_name, course_desc, teaching_team_id, late_drop_deadline
        FROM Courses
        WHERE course_id = ?
        "#,
    )
    .bind(course_id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| DbError::not_found("course", course_id))
}

/// Course repository
pub struct CourseRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CourseRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, course: &NewCourse) -> Result<Course, DbError> {
        let created = sqlx::query_as(
            r#"
            INSERT INTO Courses (course_id, course_name, course_desc, teaching_team_id)
            VALUES (?, ?, ?, ?)
            RETURNING course_id, course_name, course_desc, teaching_team_id, late_drop_deadline
            "#,
        )
        .bind(&course.course_id)
        .bind(&course.course_name)
        .bind(&course.course_desc)
        .bind(course.teaching_team_id)
        .fetch_one(self.pool)
        .await
        .map_err(DbError::conflict_on("course", &course.course_id))?;
        Ok(created)
    }

    pub async fn add_section(
        &self,
        course_id: &str,
        sec_no: i64,
        max_limit: i64,
    ) -> Result<Section, DbError> {
        let id = format!("{course_id}/{sec_no}");
        sqlx::query("INSERT INTO Sections (course_id, sec_no, max_limit) VALUES (?, ?, ?)")
            .bind(course_id)
            .bind(sec_no)
            .bind(max_limit)
            .execute(self.pool)
            .await
            .map_err(DbError::conflict_on("section", id))?;
        Ok(Section { sec_no, max_limit })
    }

    pub async fn assign_team(&self, course_id: &str, team_id: i64) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE Courses SET teaching_team_id = ? WHERE course_id = ?")
            .bind(team_id)
            .bind(course_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("course", course_id));
        }
        Ok(())
    }

    /// Store (or clear) the late-drop deadline in its `MM/DD/YY` form.
    pub async fn set_drop_deadline(
        &self,
        course_id: &str,
        deadline: Option<DropDeadline>,
    ) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE Courses SET late_drop_deadline = ? WHERE course_id = ?")
            .bind(deadline.map(|d| d.to_string()))
            .bind(course_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("course", course_id));
        }
        Ok(())
    }

    pub async fn add_professor_to_team(&self, email: &str, team_id: i64) -> Result<(), DbError> {
        sqlx::query(
            "INSERT OR IGNORE INTO Prof_Teaching_Teams (prof_email, teaching_team_id) VALUES (?, ?)",
        )
        .bind(email)
        .bind(team_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn add_ta_to_team(&self, email: &str, team_id: i64) -> Result<(), DbError> {
        sqlx::query(
            "INSERT OR IGNORE INTO TA_Teaching_Teams (student_email, teaching_team_id) VALUES (?, ?)",
        )
        .bind(email)
        .bind(team_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, course_id: &str) -> Result<Course, DbError> {
        find_course(self.pool, course_id).await
    }

    /// Catalog page ordered by course id, with the overall count.
    pub async fn list(&self, page: Page) -> Result<Paginated<Course>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT
                course_id,
                course_name,
                course_desc,
                teaching_team_id,
                late_drop_deadline,
                COUNT(*) OVER () AS total
            FROM Courses
            ORDER BY course_id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let total = match rows.first() {
            Some(row) => row.try_get::<i64, _>("total")?,
            // Past the last page the window is empty, so count separately.
            None => {
                let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM Courses")
                    .fetch_one(self.pool)
                    .await?;
                count
            }
        };

        let items = rows
            .iter()
            .map(Course::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated::new(items, total, page))
    }

    pub async fn sections(&self, course_id: &str) -> Result<Vec<SectionWithCount>, DbError> {
        let sections = sqlx::query_as(
            r#"
            SELECT s.course_id, s.sec_no, s.max_limit, COUNT(e.student_email) AS enrolled
            FROM Sections s
            LEFT JOIN Enrolls e ON e.course_id = s.course_id AND e.section_no = s.sec_no
            WHERE s.course_id = ?
            GROUP BY s.course_id, s.sec_no, s.max_limit
            ORDER BY s.sec_no
            "#,
        )
        .bind(course_id)
        .fetch_all(self.pool)
        .await?;
        Ok(sections)
    }

    /// Courses whose teaching team includes this professor.
    pub async fn taught_by(&self, email: &str) -> Result<Vec<Course>, DbError> {
        let courses = sqlx::query_as(
            r#"
            SELECT c.course_id, c.course_name, c.course_desc, c.teaching_team_id, c.late_drop_deadline
            FROM Courses c
            JOIN Prof_Teaching_Teams t ON t.teaching_team_id = c.teaching_team_id
            WHERE t.prof_email = ?
            ORDER BY c.course_id
            "#,
        )
        .bind(email)
        .fetch_all(self.pool)
        .await?;
        Ok(courses)
    }

    /// Courses this student assists on.
    pub async fn assisted_by(&self, email: &str) -> Result<Vec<Course>, DbError> {
        let courses = sqlx::query_as(
            r#"
            SELECT c.course_id, c.course_name, c.course_desc, c.teaching_team_id, c.late_drop_deadline
            FROM Courses c
            JOIN TA_Teaching_Teams t ON t.teaching_team_id = c.teaching_team_id
            WHERE t.student_email = ?
            ORDER BY c.course_id
            "#,
        )
        .bind(email)
        .fetch_all(self.pool)
        .await?;
        Ok(courses)
    }

    pub async fn professor_contact(
        &self,
        course_id: &str,
    ) -> Result<Option<ProfessorContact>, DbError> {
        let contact = sqlx::query_as(
            r#"
            SELECT u.email, u.name, p.office_address, p.department, p.title
            FROM Courses c
            JOIN Prof_Teaching_Teams t ON t.teaching_team_id = c.teaching_team_id
            JOIN Professors p ON p.email = t.prof_email
            JOIN User u ON u.email = p.email
            WHERE c.course_id = ?
            ORDER BY u.email
            LIMIT 1
            "#,
        )
        .bind(course_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(contact)
    }

    pub async fn is_prof_for_class(&self, email: &str, course_id: &str) -> Result<bool, DbError> {
        is_prof_for_class(self.pool, email, course_id).await
    }

    pub async fn is_ta_for_class(&self, email: &str, course_id: &str) -> Result<bool, DbError> {
        is_ta_for_class(self.pool, email, course_id).await
    }
}
