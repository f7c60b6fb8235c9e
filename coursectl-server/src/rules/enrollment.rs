//! Enrollment eligibility and the enroll operation
//!
//! The facts behind a decision are gathered with the same queries whether we
//! are only asking (`can_enroll`) or enrolling (`enroll`); in the latter case
//! they are read inside the transaction that performs the insert.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::{begin_write, courses, enrollments, users, DbError};
use crate::models::UserRole;

/// How strictly a section's `max_limit` is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityPolicy {
    /// Admit while the current count is at most `max_limit`, so a section
    /// can end up one over. Matches the historical roster behavior.
    #[default]
    Lenient,
    /// Admit only while the current count is below `max_limit`.
    Strict,
}

impl CapacityPolicy {
    pub fn admits(&self, enrolled: i64, max_limit: i64) -> bool {
        match self {
            Self::Lenient => enrolled <= max_limit,
            Self::Strict => enrolled < max_limit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}

impl FromStr for CapacityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown capacity policy '{other}' (expected lenient or strict)")),
        }
    }
}

/// Outcome of an eligibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollDecision {
    Eligible,
    /// Professors and unknown accounts cannot enroll
    NotAStudent,
    AlreadyEnrolled,
    /// TAs cannot enroll in a course they assist
    TeachingAssistant,
    SectionNotFound,
    SectionFull { enrolled: i64, max_limit: i64 },
}

impl EnrollDecision {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

#[derive(Debug, Clone, Copy)]
struct EnrollFacts {
    role: UserRole,
    already_enrolled: bool,
    is_ta: bool,
    /// `(max_limit, enrolled)` of the requested section
    occupancy: Option<(i64, i64)>,
}

impl EnrollFacts {
    async fn load(
        conn: &mut SqliteConnection,
        email: &str,
        course_id: &str,
        sec_no: i64,
    ) -> Result<Self, DbError> {
        let role = users::role_of(&mut *conn, email).await?;
        let already_enrolled = enrollments::find_enrollment(&mut *conn, email, course_id)
            .await?
            .is_some();
        let is_ta = courses::is_ta_for_class(&mut *conn, email, course_id).await?;
        let occupancy = courses::section_occupancy(&mut *conn, course_id, sec_no).await?;

        Ok(Self {
            role,
            already_enrolled,
            is_ta,
            occupancy,
        })
    }

    fn decide(&self, policy: CapacityPolicy) -> EnrollDecision {
        if self.role != UserRole::Student {
            return EnrollDecision::NotAStudent;
        }
        if self.already_enrolled {
            return EnrollDecision::AlreadyEnrolled;
        }
        if self.is_ta {
            return EnrollDecision::TeachingAssistant;
        }
        match self.occupancy {
            None => EnrollDecision::SectionNotFound,
            Some((max_limit, enrolled)) if !policy.admits(enrolled, max_limit) => {
                EnrollDecision::SectionFull { enrolled, max_limit }
            }
            Some(_) => EnrollDecision::Eligible,
        }
    }
}

/// Check whether the student may enroll in the section, without writing.
pub async fn can_enroll(
    pool: &SqlitePool,
    email: &str,
    course_id: &str,
    sec_no: i64,
    policy: CapacityPolicy,
) -> Result<EnrollDecision, DbError> {
    let mut conn = pool.acquire().await?;
    let facts = EnrollFacts::load(&mut conn, email, course_id, sec_no).await?;
    Ok(facts.decide(policy))
}

/// Enroll the student if eligible (atomic).
///
/// The eligibility check, the enrollment insert and the null-grade rows for
/// the section's existing homework and exams share one transaction. Any
/// decision other than `Eligible` leaves the database untouched.
pub async fn enroll(
    pool: &SqlitePool,
    email: &str,
    course_id: &str,
    sec_no: i64,
    policy: CapacityPolicy,
) -> Result<EnrollDecision, DbError> {
    let mut tx = begin_write(pool).await?;

    let decision = EnrollFacts::load(&mut tx, email, course_id, sec_no)
        .await?
        .decide(policy);
    if !decision.is_eligible() {
        tracing::debug!(student = email, course = course_id, section = sec_no, ?decision, "enrollment refused");
        return Ok(decision);
    }

    let grade_rows = enrollments::insert_enrollment(&mut tx, email, course_id, sec_no).await?;
    tx.commit().await?;

    tracing::info!(student = email, course = course_id, section = sec_no, grade_rows, "student enrolled");
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(role: UserRole, occupancy: Option<(i64, i64)>) -> EnrollFacts {
        EnrollFacts {
            role,
            already_enrolled: false,
            is_ta: false,
            occupancy,
        }
    }

    #[test]
    fn lenient_admits_one_over() {
        assert!(CapacityPolicy::Lenient.admits(30, 30));
        assert!(!CapacityPolicy::Lenient.admits(31, 30));
        assert!(!CapacityPolicy::Strict.admits(30, 30));
        assert!(CapacityPolicy::Strict.admits(29, 30));
    }

    #[test]
    fn policy_parses() {
        assert_eq!("Strict".parse::<CapacityPolicy>(), Ok(CapacityPolicy::Strict));
        assert_eq!(" lenient ".parse::<CapacityPolicy>(), Ok(CapacityPolicy::Lenient));
        assert!("loose".parse::<CapacityPolicy>().is_err());
    }

    #[test]
    fn checks_run_in_order() {
        let professor = facts(UserRole::Professor, None);
        assert_eq!(professor.decide(CapacityPolicy::Lenient), EnrollDecision::NotAStudent);

        let enrolled_ta = EnrollFacts {
            already_enrolled: true,
            is_ta: true,
            ..facts(UserRole::Student, Some((10, 0)))
        };
        assert_eq!(enrolled_ta.decide(CapacityPolicy::Lenient), EnrollDecision::AlreadyEnrolled);

        let ta = EnrollFacts {
            is_ta: true,
            ..facts(UserRole::Student, Some((10, 0)))
        };
        assert_eq!(ta.decide(CapacityPolicy::Lenient), EnrollDecision::TeachingAssistant);

        let missing = facts(UserRole::Student, None);
        assert_eq!(missing.decide(CapacityPolicy::Lenient), EnrollDecision::SectionNotFound);
    }

    #[test]
    fn full_section_reports_counts() {
        let at_limit = facts(UserRole::Student, Some((2, 2)));
        assert_eq!(at_limit.decide(CapacityPolicy::Lenient), EnrollDecision::Eligible);
        assert_eq!(
            at_limit.decide(CapacityPolicy::Strict),
            EnrollDecision::SectionFull { enrolled: 2, max_limit: 2 }
        );
    }
}
