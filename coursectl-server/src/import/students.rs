//! Student roster rows

use sqlx::SqliteConnection;

use super::{CsvRecord, CsvTable, ImportError, ImportReport};
use crate::auth::hash_password;
use crate::models::{AssignmentKind, CourseId, EmailAddress};

const REQUIRED: &[&str] = &["Email", "Full Name", "Password"];

/// Course slots per roster row
const COURSE_SLOTS: usize = 3;

pub(super) async fn load(
    conn: &mut SqliteConnection,
    table: &CsvTable,
    report: &mut ImportReport,
) -> Result<(), ImportError> {
    table.require_columns(REQUIRED)?;

    for record in table.records() {
        load_student(conn, &record, report).await?;
        report.student_rows += 1;
    }

    tracing::debug!(rows = table.len(), "student roster loaded");
    Ok(())
}

async fn load_student(
    conn: &mut SqliteConnection,
    record: &CsvRecord<'_>,
    report: &mut ImportReport,
) -> Result<(), ImportError> {
    let email = EmailAddress::new(record.require("Email")?)
        .map_err(|e| record.field_error("Email", e.to_string()))?;
    let email = email.as_str();
    let zipcode = record.int("Zip")?;

    if let Some(zip) = zipcode {
        sqlx::query("INSERT OR IGNORE INTO Zipcodes (zipcode, city, state) VALUES (?, ?, ?)")
            .bind(zip)
            .bind(record.get("City"))
            .bind(record.get("State"))
            .execute(&mut *conn)
            .await?;
    }

    report.users_created += sqlx::query(
        "INSERT OR IGNORE INTO User (email, password_hashed, name, age, gender) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(email)
    .bind(hash_password(record.require("Password")?))
    .bind(record.require("Full Name")?)
    .bind(record.int("Age")?)
    .bind(record.get("Gender"))
    .execute(&mut *conn)
    .await?
    .rows_affected();

    sqlx::query("INSERT OR IGNORE INTO Students (email, phone, major, zipcode) VALUES (?, ?, ?, ?)")
        .bind(email)
        .bind(record.get("Phone"))
        .bind(record.get("Major"))
        .bind(zipcode)
        .execute(&mut *conn)
        .await?;

    for slot in 1..=COURSE_SLOTS {
        load_course_slot(conn, record, email, slot, report).await?;
    }

    if let Some(team) = record.int("Teaching Team ID")? {
        sqlx::query(
            "INSERT OR IGNORE INTO TA_Teaching_Teams (student_email, teaching_team_id) VALUES (?, ?)",
        )
        .bind(email)
        .bind(team)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// One `Courses N` block: course, section, enrollment, and the optional
/// homework and exam with the student's grades. A blank course id skips it.
async fn load_course_slot(
    conn: &mut SqliteConnection,
    record: &CsvRecord<'_>,
    email: &str,
    slot: usize,
    report: &mut ImportReport,
) -> Result<(), ImportError> {
    let course_column = format!("Courses {slot}");
    let Some(raw_course) = record.get(&course_column) else {
        return Ok(());
    };
    let course = CourseId::new(raw_course)
        .map_err(|e| record.field_error(&course_column, e.to_string()))?;
    let course = course.as_str();

    let column = |suffix: &str| format!("Course {slot} {suffix}");

    report.courses_created += sqlx::query(
        "INSERT OR IGNORE INTO Courses (course_id, course_name, course_desc) VALUES (?, ?, ?)",
    )
    .bind(course)
    .bind(record.get(&column("Name")).unwrap_or(course))
    .bind(record.get(&column("Details")))
    .execute(&mut *conn)
    .await?
    .rows_affected();

    let sec_no = record.require_int(&column("Section"))?;
    let max_limit = record.require_int(&column("Section Limit"))?;

    report.sections_created +=
        sqlx::query("INSERT OR IGNORE INTO Sections (course_id, sec_no, max_limit) VALUES (?, ?, ?)")
            .bind(course)
            .bind(sec_no)
            .bind(max_limit)
            .execute(&mut *conn)
            .await?
            .rows_affected();

    report.enrollments_created += sqlx::query(
        "INSERT OR IGNORE INTO Enrolls (student_email, course_id, section_no) VALUES (?, ?, ?)",
    )
    .bind(email)
    .bind(course)
    .bind(sec_no)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    let slots = [
        (AssignmentKind::Homework, "HW_No", "HW_Details", "HW_Grade"),
        (AssignmentKind::Exam, "EXAM_No", "Exam_Details", "EXAM_Grade"),
    ];
    for (kind, no_col, details_col, grade_col) in slots {
        let Some(number) = record.int(&column(no_col))? else {
            continue;
        };
        let details = record.get(&column(details_col));
        let grade = record.float(&column(grade_col))?;

        let insert_assignment = format!(
            "INSERT OR IGNORE INTO {table} (course_id, sec_no, {no}, {details}) VALUES (?, ?, ?, ?)",
            table = kind.table(),
            no = kind.number_column(),
            details = kind.details_column(),
        );
        report.assignments_created += sqlx::query(&insert_assignment)
            .bind(course)
            .bind(sec_no)
            .bind(number)
            .bind(details)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        // Only for the section the student actually holds; an earlier row may
        // have enrolled them elsewhere in this course.
        let insert_grade = format!(
            "INSERT OR IGNORE INTO {grades} (student_email, course_id, sec_no, {no}, grade) \
             SELECT ?, ?, ?, ?, ? WHERE EXISTS ( \
                 SELECT 1 FROM Enrolls WHERE student_email = ? AND course_id = ? AND section_no = ?)",
            grades = kind.grades_table(),
            no = kind.number_column(),
        );
        report.grade_rows_created += sqlx::query(&insert_grade)
            .bind(email)
            .bind(course)
            .bind(sec_no)
            .bind(number)
            .bind(grade)
            .bind(email)
            .bind(course)
            .bind(sec_no)
            .execute(&mut *conn)
            .await?
            .rows_affected();
    }

    Ok(())
}
