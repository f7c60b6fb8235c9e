//! Email address validation
//!
//! Emails are the primary key of every user row, so they are trimmed and
//! checked for a basic `local@domain` shape before touching the database.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ValidationError;

const MAX_EMAIL_LEN: usize = 254;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex")
});

/// Validated email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create an email address, trimming surrounding whitespace.
    ///
    /// # Example
    /// ```
    /// use coursectl_server::models::EmailAddress;
    ///
    /// assert!(EmailAddress::new("ab123@nittany.edu").is_ok());
    /// assert!(EmailAddress::new("not-an-email").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "email" });
        }

        if s.len() > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
            });
        }

        if !EMAIL_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must look like local@domain.tld",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
