//! Homework and exam share one shape
//!
//! Both live in per-kind tables with identical columns apart from names.
//! [`AssignmentKind`] carries those names so a single repository serves both.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentKind {
    Homework,
    Exam,
}

impl AssignmentKind {
    pub const ALL: [AssignmentKind; 2] = [AssignmentKind::Homework, AssignmentKind::Exam];

    /// Assignment table
    pub fn table(&self) -> &'static str {
        match self {
            Self::Homework => "Homework",
            Self::Exam => "Exams",
        }
    }

    /// Per-section number column, shared by the assignment and grade tables
    pub fn number_column(&self) -> &'static str {
        match self {
            Self::Homework => "hw_no",
            Self::Exam => "exam_no",
        }
    }

    pub fn details_column(&self) -> &'static str {
        match self {
            Self::Homework => "hw_details",
            Self::Exam => "exam_details",
        }
    }

    /// Grade table
    pub fn grades_table(&self) -> &'static str {
        match self {
            Self::Homework => "Homework_Grades",
            Self::Exam => "Exam_Grades",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Homework => "homework",
            Self::Exam => "exam",
        }
    }
}
