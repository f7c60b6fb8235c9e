//! Professor roster rows

use sqlx::SqliteConnection;

use super::{CsvRecord, CsvTable, ImportError, ImportReport};
use crate::auth::hash_password;
use crate::models::EmailAddress;

const REQUIRED: &[&str] = &["Email", "Name", "Password"];

/// Title that makes a professor their department's head
const HEAD_TITLE: &str = "Head";

pub(super) async fn load(
    conn: &mut SqliteConnection,
    table: &CsvTable,
    report: &mut ImportReport,
) -> Result<(), ImportError> {
    table.require_columns(REQUIRED)?;

    for record in table.records() {
        load_professor(conn, &record, report).await?;
        report.professor_rows += 1;
    }

    tracing::debug!(rows = table.len(), "professor roster loaded");
    Ok(())
}

async fn load_professor(
    conn: &mut SqliteConnection,
    record: &CsvRecord<'_>,
    report: &mut ImportReport,
) -> Result<(), ImportError> {
    let email = EmailAddress::new(record.require("Email")?)
        .map_err(|e| record.field_error("Email", e.to_string()))?;
    let email = email.as_str();
    let department = record.get("Department");
    let title = record.get("Title");

    report.users_created += sqlx::query(
        "INSERT OR IGNORE INTO User (email, password_hashed, name, age, gender) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(email)
    .bind(hash_password(record.require("Password")?))
    .bind(record.require("Name")?)
    .bind(record.int("Age")?)
    .bind(record.get("Gender"))
    .execute(&mut *conn)
    .await?
    .rows_affected();

    sqlx::query(
        "INSERT OR IGNORE INTO Professors (email, office_address, department, title) VALUES (?, ?, ?, ?)",
    )
    .bind(email)
    .bind(record.get("Office"))
    .bind(department)
    .bind(title)
    .execute(&mut *conn)
    .await?;

    if title == Some(HEAD_TITLE) {
        if let Some(dept_id) = department {
            sqlx::query("INSERT OR IGNORE INTO Departments (dept_id, dept_name, dept_head) VALUES (?, ?, ?)")
                .bind(dept_id)
                .bind(record.get("Department Name"))
                .bind(email)
                .execute(&mut *conn)
                .await?;
        }
    }

    let Some(team) = record.int("Teaching Team ID")? else {
        return Ok(());
    };

    sqlx::query(
        "INSERT OR IGNORE INTO Prof_Teaching_Teams (prof_email, teaching_team_id) VALUES (?, ?)",
    )
    .bind(email)
    .bind(team)
    .execute(&mut *conn)
    .await?;

    if let Some(course) = record.get("Teaching") {
        let assigned = sqlx::query("UPDATE Courses SET teaching_team_id = ? WHERE course_id = ?")
            .bind(team)
            .bind(course)
            .execute(&mut *conn)
            .await?
            .rows_affected();
        if assigned == 0 {
            tracing::warn!(line = record.line(), course, "professor teaches a course missing from the roster");
        }
    }

    Ok(())
}
