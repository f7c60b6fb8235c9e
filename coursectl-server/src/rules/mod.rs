//! Business rules layered over the repositories
//!
//! Every rule returns an explicit outcome enum instead of a bare boolean, so
//! callers can tell *why* an enrollment or drop was refused. Rules that both
//! decide and write do so inside one transaction.

pub mod access;
pub mod drop;
pub mod enrollment;
pub mod grading;

pub use access::{course_access, is_enrolled, is_prof_for_class, is_ta_for_class, CourseAccess};
pub use drop::{drop_course, DropOutcome};
pub use enrollment::{can_enroll, enroll, CapacityPolicy, EnrollDecision};
pub use grading::{average_grade, summarize, total_grade, GradeSummary};
