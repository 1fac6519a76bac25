//! Form-level validation.
//!
//! Every form owns a [`Validator`] and feeds it the outcome of the predicate
//! checks below. A form is accepted only when [`Validator::valid`] holds.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// A permissive email shape check: local part, `@`, dotted domain.
pub static EMAIL_RX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// Accumulates the errors found while checking one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    field_errors: HashMap<String, String>,
    non_field_errors: Vec<String>,
}

impl Validator {
    /// Creates a validator with no errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no errors have been recorded.
    pub fn valid(&self) -> bool {
        self.field_errors.is_empty() && self.non_field_errors.is_empty()
    }

    /// Records an error against `key`. The first error for a key is kept.
    pub fn add_field_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.field_errors
            .entry(key.into())
            .or_insert_with(|| message.into());
    }

    /// Records an error that is not tied to a single field.
    pub fn add_non_field_error(&mut self, message: impl Into<String>) {
        self.non_field_errors.push(message.into());
    }

    /// Records `message` against `key` unless `ok` holds.
    pub fn check_field(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_field_error(key, message);
        }
    }

    /// The error recorded for `key`, if any.
    pub fn field_error(&self, key: &str) -> Option<&str> {
        self.field_errors.get(key).map(String::as_str)
    }

    /// All errors tied to fields.
    pub fn field_errors(&self) -> &HashMap<String, String> {
        &self.field_errors
    }

    /// All errors not tied to a field, in the order they were added.
    pub fn non_field_errors(&self) -> &[String] {
        &self.non_field_errors
    }
}

/// Whether `value` has any non-whitespace content.
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Whether `value` has at most `max` characters.
pub fn max_chars(value: &str, max: usize) -> bool {
    value.chars().count() <= max
}

/// Whether `value` has at least `min` characters.
pub fn min_chars(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

/// Whether `value` matches `rx`.
pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

/// Whether `value` is one of `permitted`.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}
