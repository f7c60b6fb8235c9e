//! Late-drop deadline parsing
//!
//! Deadlines are persisted as `MM/DD/YY` text, the format of the roster
//! exports. ISO `YYYY-MM-DD` is also accepted on input.

use chrono::NaiveDate;

use super::ValidationError;

/// Storage format for deadlines
pub const DEADLINE_FORMAT: &str = "%m/%d/%y";

/// Parsed late-drop deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DropDeadline(NaiveDate);

impl DropDeadline {
    /// Parse `MM/DD/YY` (single-digit month/day allowed) or `YYYY-MM-DD`.
    ///
    /// # Example
    /// ```
    /// use coursectl_server::models::DropDeadline;
    ///
    /// let d = DropDeadline::parse("4/5/04").unwrap();
    /// assert_eq!(d.to_string(), "04/05/04");
    /// ```
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "drop deadline" });
        }

        NaiveDate::parse_from_str(s, DEADLINE_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
            .map(Self)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "drop deadline",
                reason: "expected MM/DD/YY or YYYY-MM-DD",
            })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Dropping is allowed up to and including the deadline day.
    pub fn allows_drop_on(&self, today: NaiveDate) -> bool {
        today <= self.0
    }
}

impl std::fmt::Display for DropDeadline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DEADLINE_FORMAT))
    }
}
