//! Who may do what in a course

use sqlx::SqlitePool;

use crate::db::{courses, enrollments, users, DbError};
use crate::models::{CourseRole, UserRole};

/// Everything the access checks know about one user and one course
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseAccess {
    pub role: UserRole,
    pub is_professor: bool,
    pub is_ta: bool,
    /// Section the user is enrolled in, if any
    pub section: Option<i64>,
}

impl CourseAccess {
    /// Strongest relationship wins: professor, then TA, then enrolled.
    pub fn course_role(&self) -> CourseRole {
        if self.is_professor {
            CourseRole::Professor
        } else if self.is_ta {
            CourseRole::TeachingAssistant
        } else if self.section.is_some() {
            CourseRole::Enrolled
        } else {
            CourseRole::Visitor
        }
    }
}

/// Resolve the user's relationship to a course.
///
/// Fails with `NotFound` when the course does not exist.
pub async fn course_access(
    pool: &SqlitePool,
    email: &str,
    course_id: &str,
) -> Result<CourseAccess, DbError> {
    courses::find_course(pool, course_id).await?;

    let role = users::role_of(pool, email).await?;
    let (is_professor, is_ta, section) = match role {
        UserRole::Professor => (courses::is_prof_for_class(pool, email, course_id).await?, false, None),
        UserRole::Student => {
            let is_ta = courses::is_ta_for_class(pool, email, course_id).await?;
            let section = enrollments::find_enrollment(pool, email, course_id)
                .await?
                .map(|e| e.section_no);
            (false, is_ta, section)
        }
        UserRole::Unknown => (false, false, None),
    };

    Ok(CourseAccess {
        role,
        is_professor,
        is_ta,
        section,
    })
}

pub async fn is_enrolled(pool: &SqlitePool, email: &str, course_id: &str) -> Result<bool, DbError> {
    Ok(enrollments::find_enrollment(pool, email, course_id)
        .await?
        .is_some())
}

/// A course with no teaching team is administered by nobody.
pub async fn is_prof_for_class(
    pool: &SqlitePool,
    email: &str,
    course_id: &str,
) -> Result<bool, DbError> {
    courses::is_prof_for_class(pool, email, course_id).await
}

pub async fn is_ta_for_class(
    pool: &SqlitePool,
    email: &str,
    course_id: &str,
) -> Result<bool, DbError> {
    courses::is_ta_for_class(pool, email, course_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn access(is_professor: bool, is_ta: bool, section: Option<i64>) -> CourseAccess {
        CourseAccess {
            role: UserRole::Student,
            is_professor,
            is_ta,
            section,
        }
    }

    #[test]
    fn role_precedence() {
        assert_eq!(access(true, true, Some(1)).course_role(), CourseRole::Professor);
        assert_eq!(access(false, true, Some(1)).course_role(), CourseRole::TeachingAssistant);
        assert_eq!(access(false, false, Some(1)).course_role(), CourseRole::Enrolled);
        assert_eq!(access(false, false, None).course_role(), CourseRole::Visitor);
    }
}
