//! Validation utilities.

use crate::FieldError;
use validator::ValidationErrors;

/// Flattens `validator::ValidationErrors` into field errors, sorted by field
/// name so responses are stable.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), |m| m.to_string()),
                code: error.code.to_string(),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Common validation functions.
pub mod rules {
    use regex::Regex;
    use std::sync::OnceLock;
    use validator::ValidationError;

    const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

    fn email_regex() -> &'static Regex {
        static EMAIL: OnceLock<Regex> = OnceLock::new();
        EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
    }

    /// Validates a conventional `local@domain.tld` address.
    ///
    /// Stricter than RFC 5322: the top-level domain must be at least two
    /// ASCII letters.
    pub fn email_address(value: &str) -> Result<(), ValidationError> {
        if !email_regex().is_match(value) {
            return Err(ValidationError::new("email"));
        }
        Ok(())
    }
}
