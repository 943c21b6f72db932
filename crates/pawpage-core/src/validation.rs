#![forbid(unsafe_code)]

//! Field validators for the contact form.
//!
//! Two rules exist: [`Required`] (trimmed value must be non-empty) and
//! [`Email`] (a permissive `local@domain.tld` shape check). Both implement
//! [`Validator<str>`] and report failures as a [`ValidationError`] carrying a
//! stable code.
//!
//! ```rust
//! use pawpage_core::validation::{Email, Required, Validator};
//!
//! assert!(Required::new().validate(" Ana ").is_valid());
//! assert!(Required::new().validate("   ").is_invalid());
//! assert!(Email::new().validate("ana@example.com").is_valid());
//! assert!(Email::new().validate("not-an-email").is_invalid());
//! ```

use std::fmt;

/// Error code for required field validation.
pub const ERROR_CODE_REQUIRED: &str = "required";
/// Error code for email validation.
pub const ERROR_CODE_EMAIL: &str = "email";

/// A validation failure with a stable code and a default message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Stable error code for programmatic handling.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The result of a validation operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationResult {
    #[default]
    Valid,
    Invalid(ValidationError),
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// Returns the error if the result is `Invalid`.
    #[must_use]
    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Valid => None,
            Self::Invalid(e) => Some(e),
        }
    }

    /// Keep the first failure.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::Valid => other,
            Self::Invalid(_) => self,
        }
    }
}

/// A rule over values of type `T`.
pub trait Validator<T: ?Sized> {
    fn validate(&self, value: &T) -> ValidationResult;

    /// Default message reported on failure.
    fn error_message(&self) -> &str;
}

/// Whitespace as browsers define it for `String.prototype.trim` and the
/// regex class `\s`: Unicode `White_Space` plus U+FEFF, minus U+0085.
#[must_use]
pub fn is_form_space(c: char) -> bool {
    match c {
        '\u{FEFF}' => true,
        '\u{0085}' => false,
        c => c.is_whitespace(),
    }
}

/// Strip leading and trailing [`is_form_space`] characters.
#[must_use]
pub fn trim_form_value(value: &str) -> &str {
    value.trim_matches(is_form_space)
}

/// Value must be non-empty after trimming surrounding whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Required {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Validator<str> for Required {
    fn validate(&self, value: &str) -> ValidationResult {
        if trim_form_value(value).is_empty() {
            ValidationResult::Invalid(ValidationError::new(
                ERROR_CODE_REQUIRED,
                self.error_message(),
            ))
        } else {
            ValidationResult::Valid
        }
    }

    fn error_message(&self) -> &str {
        "This field is required"
    }
}

/// Permissive email shape check.
///
/// Accepts exactly what `^[^\s@]+@[^\s@]+\.[^\s@]+$` accepts on the trimmed
/// value: one `@`, no whitespace, a non-empty local part, and a domain with
/// a dot that is neither its first nor its last character. Consecutive dots
/// pass and so does `+`; this only catches obviously malformed input.
///
/// Empty input is valid; pair with [`Required`] when the field is mandatory.
#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

impl Email {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// The raw shape test, without trimming or the empty-input exemption.
    #[must_use]
    pub fn matches_pattern(value: &str) -> bool {
        if value.chars().any(is_form_space) {
            return false;
        }
        let Some((local, domain)) = value.split_once('@') else {
            return false;
        };
        if local.is_empty() || domain.contains('@') {
            return false;
        }
        // Some dot with at least one char on each side within the domain.
        domain
            .char_indices()
            .any(|(i, ch)| ch == '.' && i > 0 && i + 1 < domain.len())
    }
}

impl Validator<str> for Email {
    fn validate(&self, value: &str) -> ValidationResult {
        let trimmed = trim_form_value(value);
        if trimmed.is_empty() || Self::matches_pattern(trimmed) {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(ValidationError::new(ERROR_CODE_EMAIL, self.error_message()))
        }
    }

    fn error_message(&self) -> &str {
        "Invalid email address"
    }
}
