//! Course identifier validation

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

const MAX_COURSE_ID_LEN: usize = 32;

/// Course codes like `CMPSC431W` or `MATH-140`
static COURSE_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("invalid course id regex")
});

/// Validated course identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CourseId(String);

impl CourseId {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "course id" });
        }

        if s.len() > MAX_COURSE_ID_LEN {
            return Err(ValidationError::TooLong {
                field: "course id",
                max: MAX_COURSE_ID_LEN,
            });
        }

        if !COURSE_ID_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "course id",
                reason: "must be alphanumeric with hyphens/underscores",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CourseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
