// Common validation types and traits

use once_regex::{EMAIL_RE, SLUG_RE};

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Returns `Ok(())` when valid, otherwise the result itself as the error
    pub fn into_result(self) -> Result<(), ValidationResult> {
        if self.is_valid {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Lowercase ASCII words separated by single hyphens, e.g. `kyoto-temple-walk`
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

mod once_regex {
    use once_cell::sync::Lazy;
    use regex::Regex;

    pub static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    });

    pub static SLUG_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug regex is valid")
    });
}
