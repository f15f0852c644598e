//! Local input checks run before any request is sent.
//!
//! Course codes and domain names become storage container, blob folder and
//! search index names on the backend, so they are limited to lowercase
//! letters, digits and interior hyphens.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Input rejected before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Empty { field: &'static str },

    #[error("{field} '{value}' can only contain lowercase letters, numbers and hyphens")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
        value: u32,
    },
}

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER.get_or_init(|| {
        Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("identifier pattern is valid")
    })
}

fn validate_identifier(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if !identifier_regex().is_match(value) {
        return Err(ValidationError::InvalidIdentifier {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Check a course code such as `cs1003` or `cs-1003`.
pub fn validate_course_code(code: &str) -> Result<(), ValidationError> {
    validate_identifier("Course code", code)
}

pub fn validate_domain_name(name: &str) -> Result<(), ValidationError> {
    validate_identifier("Domain name", name)
}

/// Minimal shape check for an invitation address; the identity provider does the rest.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Empty { field: "Email" });
    }
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace) =>
        {
            Ok(())
        }
        _ => Err(ValidationError::InvalidEmail(email.to_string())),
    }
}

pub fn validate_range(
    field: &'static str,
    value: u32,
    min: u32,
    max: u32,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

/// Storage container name for a course: lowercased, spaces become hyphens.
pub fn container_name(course: &str) -> String {
    course.trim().to_lowercase().replace(' ', "-")
}
