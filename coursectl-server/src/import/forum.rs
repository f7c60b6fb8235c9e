//! Forum seed rows: per-course drop deadline plus a first post and comment

use sqlx::SqliteConnection;

use super::{CsvRecord, CsvTable, ImportError, ImportReport};
use crate::models::DropDeadline;

const REQUIRED: &[&str] = &["Courses"];

pub(super) async fn load(
    conn: &mut SqliteConnection,
    table: &CsvTable,
    report: &mut ImportReport,
) -> Result<(), ImportError> {
    table.require_columns(REQUIRED)?;

    for record in table.records() {
        load_row(conn, &record, report).await?;
        report.forum_rows += 1;
    }

    tracing::debug!(rows = table.len(), "forum seed loaded");
    Ok(())
}

async fn load_row(
    conn: &mut SqliteConnection,
    record: &CsvRecord<'_>,
    report: &mut ImportReport,
) -> Result<(), ImportError> {
    let course = record.require("Courses")?;

    if let Some(raw) = record.get("Drop Deadline") {
        let deadline = DropDeadline::parse(raw)
            .map_err(|e| record.field_error("Drop Deadline", e.to_string()))?;
        sqlx::query("UPDATE Courses SET late_drop_deadline = ? WHERE course_id = ?")
            .bind(deadline.to_string())
            .bind(course)
            .execute(&mut *conn)
            .await?;
    }

    if let (Some(author), Some(content)) = (record.get("Post 1 By"), record.get("Post 1")) {
        report.posts_created += sqlx::query(
            r#"
            INSERT OR IGNORE INTO Posts (course_id, post_no, student_email, post_content)
            SELECT ?, 1, ?, ? WHERE EXISTS (SELECT 1 FROM Courses WHERE course_id = ?)
            "#,
        )
        .bind(course)
        .bind(author)
        .bind(content)
        .bind(course)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }

    if let (Some(author), Some(content)) = (record.get("Comment 1 By"), record.get("Comment 1")) {
        report.comments_created += sqlx::query(
            r#"
            INSERT OR IGNORE INTO Comments (course_id, post_no, comment_no, student_email, comment_content)
            SELECT ?, 1, 1, ?, ? WHERE EXISTS (SELECT 1 FROM Posts WHERE course_id = ? AND post_no = 1)
            "#,
        )
        .bind(course)
        .bind(author)
        .bind(content)
        .bind(course)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }

    Ok(())
}
