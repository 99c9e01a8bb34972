//! Input validation and field error mapping
//!
//! Two sources of field errors end up in the same shape:
//! - Client-side checks run before a form is submitted (range checks on
//!   the health profile, required fields, email format)
//! - Server-side validation errors returned as `[{path, message}]`
//!
//! # Example
//!
//! ```rust,ignore
//! use healthwatch_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("email", &form.email)
//!     .email("email", &form.email)
//!     .range("age", form.age, 0, 120)
//!     .validate();
//!
//! if !result.is_valid() {
//!     for error in result.errors() {
//!         eprintln!("{}", error);
//!     }
//! }
//! ```

use crate::error::{Error, ErrorCode, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// Validation error for a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }

    /// Per-field view of the errors
    #[must_use]
    pub fn field_errors(&self) -> FieldErrors {
        FieldErrors::from_pairs(self.errors.iter().map(|e| (e.field.as_str(), e.message.as_str())))
    }

    /// Convert to Result type
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
            Err(Error::new(
                ErrorCode::ValidationError,
                format!("Validation failed: {}", messages.join("; ")),
            ))
        }
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    #[must_use]
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    fn fail(mut self, field: &str, message: String, code: &str) -> Self {
        self.result.add_error(ValidationError {
            field: field.to_string(),
            message,
            code: code.to_string(),
        });
        self
    }

    /// Validate that a field is not empty
    #[must_use]
    pub fn required(self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            return self.fail(field, "Field is required".to_string(), "REQUIRED");
        }
        self
    }

    /// Validate minimum length
    #[must_use]
    pub fn min_length(self, field: &str, value: &str, min: usize) -> Self {
        if value.chars().count() < min {
            return self.fail(field, format!("Must be at least {min} characters"), "MIN_LENGTH");
        }
        self
    }

    /// Validate maximum length
    #[must_use]
    pub fn max_length(self, field: &str, value: &str, max: usize) -> Self {
        if value.chars().count() > max {
            return self.fail(field, format!("Must be at most {max} characters"), "MAX_LENGTH");
        }
        self
    }

    /// Validate email format (empty values are left to `required`)
    #[must_use]
    pub fn email(self, field: &str, value: &str) -> Self {
        if !value.is_empty() && !EMAIL_RE.is_match(value) {
            return self.fail(field, "Must be a valid email address".to_string(), "EMAIL");
        }
        self
    }

    /// Validate that a value is in a list of allowed values
    #[must_use]
    pub fn one_of(self, field: &str, value: &str, allowed: &[&str]) -> Self {
        if !allowed.contains(&value) {
            return self.fail(
                field,
                format!("Must be one of: {}", allowed.join(", ")),
                "ONE_OF",
            );
        }
        self
    }

    /// Validate a numeric range (inclusive)
    #[must_use]
    pub fn range<T: PartialOrd + std::fmt::Display>(
        self,
        field: &str,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        if value < min || value > max {
            return self.fail(field, format!("Must be between {min} and {max}"), "RANGE");
        }
        self
    }

    /// Validate a numeric range only when a value is present
    #[must_use]
    pub fn optional_range<T: PartialOrd + std::fmt::Display>(
        self,
        field: &str,
        value: Option<T>,
        min: T,
        max: T,
    ) -> Self {
        match value {
            Some(v) => self.range(field, v, min, max),
            None => self,
        }
    }

    /// Add a custom validation
    #[must_use]
    pub fn custom<F>(self, field: &str, f: F) -> Self
    where
        F: FnOnce() -> Option<String>,
    {
        match f() {
            Some(message) => self.fail(field, message, "CUSTOM"),
            None => self,
        }
    }

    /// Complete validation and return result
    #[must_use]
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

/// Field name to error message map, as shown next to form fields
///
/// Server paths such as `healthProfile.weight` or `body.age` are reduced to
/// their last segment so they line up with the client's field names. The
/// first message for a field wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Build from `(path, message)` pairs
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut map = BTreeMap::new();
        for (path, message) in pairs {
            map.entry(field_name(path).to_string())
                .or_insert_with(|| message.to_string());
        }
        Self(map)
    }

    /// Message for a field, if any
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether no field has an error
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with errors
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate `(field, message)` in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn field_name(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}
