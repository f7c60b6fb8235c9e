//! Grade aggregation
//!
//! Homework and exams weigh equally, item by item. Ungraded (null) rows are
//! left out of both the sum and the count.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::{DbError, GradeRepo};
use crate::models::AssignmentKind;

/// A student's standing in one course
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeSummary {
    pub homework_average: Option<f64>,
    pub exam_average: Option<f64>,
    /// Mean of all graded items, in points
    pub total: Option<f64>,
}

impl GradeSummary {
    /// Total on the 100-point scale as a fraction, e.g. 70 points -> 0.70.
    pub fn total_ratio(&self) -> Option<f64> {
        self.total.map(|points| points / 100.0)
    }
}

/// Mean of the student's graded items of one kind, `None` if none are graded.
pub async fn average_grade(
    pool: &SqlitePool,
    kind: AssignmentKind,
    email: &str,
    course_id: &str,
) -> Result<Option<f64>, DbError> {
    GradeRepo::new(pool).average(kind, email, course_id).await
}

/// `sum / count` over all graded homework and exams, `None` if none are graded.
pub async fn total_grade(
    pool: &SqlitePool,
    email: &str,
    course_id: &str,
) -> Result<Option<f64>, DbError> {
    let (sum, count) = GradeRepo::new(pool).totals(email, course_id).await?;
    if count == 0 {
        return Ok(None);
    }
    Ok(Some(sum / count as f64))
}

pub async fn summarize(
    pool: &SqlitePool,
    email: &str,
    course_id: &str,
) -> Result<GradeSummary, DbError> {
    Ok(GradeSummary {
        homework_average: average_grade(pool, AssignmentKind::Homework, email, course_id).await?,
        exam_average: average_grade(pool, AssignmentKind::Exam, email, course_id).await?,
        total: total_grade(pool, email, course_id).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_scales_points() {
        let summary = GradeSummary {
            homework_average: Some(80.0),
            exam_average: Some(60.0),
            total: Some(70.0),
        };
        let ratio = summary.total_ratio().unwrap();
        assert!((ratio - 0.70).abs() < 1e-9);
    }

    #[test]
    fn nothing_graded_has_no_ratio() {
        let summary = GradeSummary {
            homework_average: None,
            exam_average: None,
            total: None,
        };
        assert_eq!(summary.total_ratio(), None);
    }
}
