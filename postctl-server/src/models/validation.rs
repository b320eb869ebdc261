//! Validation error types
//!
//! The display text of each variant is returned verbatim to API clients
//! inside the message envelope, so it must stay stable.

use std::fmt;

/// Validation error for content writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title or body is empty
    Empty { field: &'static str },

    /// Status is missing or not one of `draft` / `publish`
    InvalidStatus { value: String },
}

impl ValidationError {
    /// Name of the offending request field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } => field,
            Self::InvalidStatus { .. } => "status",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { .. } => write!(f, "error input"),
            Self::InvalidStatus { .. } => write!(f, "error input Status must (draft / publish)"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::Empty { field: "title" };
        assert_eq!(err.to_string(), "error input");

        let err = ValidationError::InvalidStatus {
            value: "archived".into(),
        };
        assert_eq!(err.to_string(), "error input Status must (draft / publish)");
    }

    #[test]
    fn reports_field() {
        assert_eq!(ValidationError::Empty { field: "content" }.field(), "content");
        assert_eq!(
            ValidationError::InvalidStatus { value: String::new() }.field(),
            "status"
        );
    }
}
