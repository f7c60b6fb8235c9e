//! Validation error types

use std::fmt;

/// Validation error for domain models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g., email, date)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Two fields that must agree do not (e.g., password confirmation)
    Mismatch { field: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::Mismatch { field } => write!(f, "{} does not match", field),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "content",
            max: 4096,
        };
        assert_eq!(
            err.to_string(),
            "content exceeds maximum length of 4096 characters"
        );
        assert_eq!(
            ValidationError::Mismatch { field: "password confirmation" }.to_string(),
            "password confirmation does not match"
        );
    }
}
