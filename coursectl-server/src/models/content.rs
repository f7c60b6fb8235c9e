//! Free-text content validation for posts, comments and assignment details

use super::ValidationError;

/// Maximum length for forum content and assignment details
const MAX_CONTENT_LEN: usize = 8192;

/// Validated, non-blank text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content(String);

impl Content {
    /// Create new content for the named field.
    ///
    /// # Rules
    /// - Must contain something other than whitespace
    /// - Max 8KB
    pub fn new(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        if s.trim().is_empty() {
            return Err(ValidationError::Empty { field });
        }

        if s.len() > MAX_CONTENT_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_CONTENT_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Content {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
