//! Repository implementations for database access
//!
//! Each repository borrows the pool. Helpers that must run inside a caller's
//! transaction take `&mut SqliteConnection` instead, so the same query serves
//! both a pooled read and a transactional write.

pub mod assignments;
pub mod courses;
pub mod enrollments;
pub mod forum;
pub mod grades;
pub mod sessions;
pub mod users;

pub use assignments::{Assignment, AssignmentRepo, NewAssignment};
pub use courses::{Course, CourseRepo, NewCourse, ProfessorContact, Section, SectionWithCount};
pub use enrollments::{EnrolledCourse, Enrollment, EnrollmentRepo};
pub use forum::{Comment, CommentView, ForumRepo, Post, PostWithComments};
pub use grades::{AssignmentGrade, GradeRepo, GradeSheetRow};
pub use sessions::SessionRepo;
pub use users::{NewProfessor, NewStudent, ProfessorProfile, StudentProfile, User, UserRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("already exists: {resource} '{id}'")]
    Conflict { resource: &'static str, id: String },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Turn a unique-key violation into `Conflict`, pass anything else through.
    pub(crate) fn conflict_on(resource: &'static str, id: impl Into<String>) -> impl FnOnce(sqlx::Error) -> Self {
        let id = id.into();
        move |err| {
            let unique = err
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if unique {
                Self::Conflict { resource, id }
            } else {
                Self::Sqlx(err)
            }
        }
    }
}
