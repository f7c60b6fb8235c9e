//! Account roles and per-course relationships

use serde::Serialize;

/// What kind of account an email belongs to.
///
/// Resolved from which profile table holds the email; a row in `Students`
/// wins over a row in `Professors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Professor,
    Unknown,
}

impl UserRole {
    /// Map the tag produced by the role query.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("student") => Self::Student,
            Some("professor") => Self::Professor,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Professor => "professor",
            Self::Unknown => "unknown",
        }
    }
}

/// How a user relates to one course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseRole {
    /// Professor on the course's teaching team
    Professor,
    /// Student on the course's teaching team
    TeachingAssistant,
    /// Student enrolled in one of the course's sections
    Enrolled,
    /// Anyone else; may browse the course but not its forum or grades
    Visitor,
}

impl CourseRole {
    /// Whether this relationship may read and write the course forum.
    pub fn can_use_forum(&self) -> bool {
        !matches!(self, Self::Visitor)
    }

    /// Whether this relationship may create assignments and enter grades.
    pub fn can_administer(&self) -> bool {
        matches!(self, Self::Professor)
    }
}
