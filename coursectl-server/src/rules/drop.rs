//! Dropping a course before its late-drop deadline

use sqlx::SqlitePool;

use crate::clock::Clock;
use crate::db::{begin_write, courses, enrollments, forum, DbError};
use crate::models::DropDeadline;

/// Outcome of a drop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Enrollment, grades and the student's forum activity were removed
    Dropped {
        posts_removed: u64,
        comments_removed: u64,
    },
    /// No enrollment in that course (and section, when one was given)
    NotEnrolled,
    /// The course has no deadline, so drops are closed
    NoDeadline,
    PastDeadline { deadline: DropDeadline },
}

/// Drop the student from the course if the deadline allows it (atomic).
///
/// `sec_no` narrows the request to one section; `None` means whichever
/// section the student is in. Grade rows go with the enrollment by cascade.
/// Every outcome other than `Dropped` leaves the database untouched.
pub async fn drop_course(
    pool: &SqlitePool,
    clock: &dyn Clock,
    email: &str,
    course_id: &str,
    sec_no: Option<i64>,
) -> Result<DropOutcome, DbError> {
    let mut tx = begin_write(pool).await?;

    let enrollment = enrollments::find_enrollment(&mut *tx, email, course_id).await?;
    let enrollment = match enrollment {
        Some(e) if sec_no.map_or(true, |s| s == e.section_no) => e,
        _ => return Ok(DropOutcome::NotEnrolled),
    };

    let course = courses::find_course(&mut *tx, course_id).await?;
    let Some(deadline) = course.drop_deadline() else {
        return Ok(DropOutcome::NoDeadline);
    };

    let today = clock.today();
    if !deadline.allows_drop_on(today) {
        tracing::debug!(student = email, course = course_id, %deadline, %today, "drop refused after deadline");
        return Ok(DropOutcome::PastDeadline { deadline });
    }

    let (posts_removed, comments_removed) = forum::delete_by_author(&mut tx, course_id, email).await?;
    enrollments::delete_enrollment(&mut *tx, email, course_id).await?;
    tx.commit().await?;

    tracing::info!(
        student = email,
        course = course_id,
        section = enrollment.section_no,
        posts_removed,
        comments_removed,
        "student dropped course"
    );

    Ok(DropOutcome::Dropped {
        posts_removed,
        comments_removed,
    })
}
