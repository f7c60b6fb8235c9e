//! Bulk roster import from CSV exports
//!
//! Three sources, each optional:
//!
//! - student roster (`Students_TA.csv`): accounts, zipcodes, up to three
//!   course enrollments with one homework and exam each, TA team
//! - professor roster (`Professors.csv`): accounts, departments, teams
//! - forum seed (`Posts_Comments.csv`): drop deadlines, first post/comment
//!
//! Everything runs in one transaction with `INSERT OR IGNORE`, so re-running
//! an import is harmless and a bad row leaves the database untouched.

mod csv;
mod forum;
mod professors;
mod students;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::{begin_write, DbError};
use crate::models::AssignmentKind;

pub use self::csv::{CsvRecord, CsvTable};

pub const STUDENTS_FILE: &str = "Students_TA.csv";
pub const PROFESSORS_FILE: &str = "Professors.csv";
pub const FORUM_FILE: &str = "Posts_Comments.csv";

/// Import error type
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read {}: {error}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("{file}:{line}: {message}")]
    Csv {
        file: &'static str,
        line: usize,
        message: String,
    },

    #[error("{file}: missing column '{column}'")]
    MissingColumn { file: &'static str, column: String },

    #[error("{file}:{line}: column '{column}': {reason}")]
    Field {
        file: &'static str,
        line: usize,
        column: String,
        reason: String,
    },

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<sqlx::Error> for ImportError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(DbError::Sqlx(err))
    }
}

/// CSV text for each source; `None` skips it
#[derive(Debug, Clone, Default)]
pub struct ImportSources {
    pub students: Option<String>,
    pub professors: Option<String>,
    pub forum: Option<String>,
}

impl ImportSources {
    /// Read whichever of the three export files exist in `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, ImportError> {
        Ok(Self {
            students: read_if_present(&dir.join(STUDENTS_FILE))?,
            professors: read_if_present(&dir.join(PROFESSORS_FILE))?,
            forum: read_if_present(&dir.join(FORUM_FILE))?,
        })
    }

    /// Read explicitly named files; every given path must exist.
    pub fn from_files(
        students: Option<&Path>,
        professors: Option<&Path>,
        forum: Option<&Path>,
    ) -> Result<Self, ImportError> {
        let read = |path: Option<&Path>| -> Result<Option<String>, ImportError> {
            path.map(|p| {
                std::fs::read_to_string(p).map_err(|error| ImportError::Io {
                    path: p.to_path_buf(),
                    error,
                })
            })
            .transpose()
        };
        Ok(Self {
            students: read(students)?,
            professors: read(professors)?,
            forum: read(forum)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_none() && self.professors.is_none() && self.forum.is_none()
    }
}

fn read_if_present(path: &Path) -> Result<Option<String>, ImportError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(ImportError::Io {
            path: path.to_path_buf(),
            error,
        }),
    }
}

/// Row counts from one import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub student_rows: usize,
    pub professor_rows: usize,
    pub forum_rows: usize,
    /// User rows inserted (existing emails are left alone)
    pub users_created: u64,
    pub courses_created: u64,
    pub sections_created: u64,
    pub enrollments_created: u64,
    pub assignments_created: u64,
    /// Grade rows from the roster plus null rows filled in afterwards
    pub grade_rows_created: u64,
    pub posts_created: u64,
    pub comments_created: u64,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "rows read: {} students, {} professors, {} forum",
            self.student_rows, self.professor_rows, self.forum_rows
        )?;
        writeln!(
            f,
            "created: {} users, {} courses, {} sections, {} enrollments",
            self.users_created, self.courses_created, self.sections_created, self.enrollments_created
        )?;
        write!(
            f,
            "created: {} assignments, {} grade rows, {} posts, {} comments",
            self.assignments_created, self.grade_rows_created, self.posts_created, self.comments_created
        )
    }
}

/// Import all given sources in one transaction.
///
/// Students load first, then professors (who attach teams to the courses the
/// students created), then the forum seed. Finally every enrolled student gets
/// a null grade for any assignment of their section they have no row for.
pub async fn import_all(
    pool: &SqlitePool,
    sources: &ImportSources,
) -> Result<ImportReport, ImportError> {
    // Parse everything up front so a malformed file fails before any write.
    let student_table = sources
        .students
        .as_deref()
        .map(|text| CsvTable::parse(STUDENTS_FILE, text))
        .transpose()?;
    let professor_table = sources
        .professors
        .as_deref()
        .map(|text| CsvTable::parse(PROFESSORS_FILE, text))
        .transpose()?;
    let forum_table = sources
        .forum
        .as_deref()
        .map(|text| CsvTable::parse(FORUM_FILE, text))
        .transpose()?;

    let mut report = ImportReport::default();
    let mut tx = begin_write(pool).await?;

    if let Some(table) = &student_table {
        students::load(&mut tx, table, &mut report).await?;
    }
    if let Some(table) = &professor_table {
        professors::load(&mut tx, table, &mut report).await?;
    }
    if let Some(table) = &forum_table {
        forum::load(&mut tx, table, &mut report).await?;
    }
    report.grade_rows_created += backfill_grades(&mut tx).await?;

    tx.commit().await?;

    tracing::info!(
        students = report.student_rows,
        professors = report.professor_rows,
        forum = report.forum_rows,
        enrollments = report.enrollments_created,
        "import complete"
    );
    Ok(report)
}

/// Give every enrolled student a null grade row for each assignment of their
/// section that they have no row for yet.
async fn backfill_grades(conn: &mut SqliteConnection) -> Result<u64, ImportError> {
    let mut created = 0;
    for kind in AssignmentKind::ALL {
        let sql = format!(
            "INSERT OR IGNORE INTO {grades} (student_email, course_id, sec_no, {no}, grade) \
             SELECT e.student_email, a.course_id, a.sec_no, a.{no}, NULL \
             FROM Enrolls e \
             JOIN {table} a ON a.course_id = e.course_id AND a.sec_no = e.section_no",
            grades = kind.grades_table(),
            no = kind.number_column(),
            table = kind.table(),
        );
        created += sqlx::query(&sql).execute(&mut *conn).await?.rows_affected();
    }
    Ok(created)
}
