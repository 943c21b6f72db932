#![forbid(unsafe_code)]

//! Contact form gatekeeping.
//!
//! Every submit runs the same synchronous pass:
//!
//! 1. the native submission is cancelled,
//! 2. each checked field is read fresh from the form and validated,
//! 3. each field's invalid marker is rewritten from that verdict,
//! 4. only then is the feedback region updated and, on success, the form
//!    reset.
//!
//! Nothing survives between submissions; the returned [`FormOutcome`] is the
//! only record of an attempt.

use crate::config::FormConfig;
use crate::host::PageHost;
use crate::validation::{Email, Required, ValidationError, ValidationResult, Validator};

/// A field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field `name`.
    pub field: String,
    /// First failing rule.
    pub error: ValidationError,
}

/// Why a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rejection {
    /// Failing fields in check order.
    pub errors: Vec<FieldError>,
}

impl Rejection {
    /// Names of the failing fields.
    pub fn invalid_fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.field.as_str())
    }

    #[must_use]
    pub fn is_invalid(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Error reported for `field`, if it failed.
    #[must_use]
    pub fn error_for(&self, field: &str) -> Option<&ValidationError> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| &e.error)
    }
}

/// Result of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormOutcome {
    /// No submit has resolved yet.
    #[default]
    Pending,
    Rejected(Rejection),
    Accepted,
}

impl FormOutcome {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

/// Validator bound to one form on the page.
#[derive(Debug, Clone)]
pub struct FormValidator<N> {
    form: N,
    feedback: Option<N>,
    config: FormConfig,
}

impl<N: Clone + PartialEq + core::fmt::Debug> FormValidator<N> {
    /// Resolve the form and its optional feedback region.
    ///
    /// Returns `None` when the form is absent.
    pub fn wire<H: PageHost<Node = N>>(host: &H, config: &FormConfig) -> Option<Self> {
        let Some(form) = host.query(&config.form) else {
            crate::debug!(selector = %config.form, "form not found; validation disabled");
            return None;
        };
        let feedback = host.query(&config.feedback);
        if feedback.is_none() {
            crate::debug!(selector = %config.feedback, "feedback region not found");
        }
        Some(Self {
            form,
            feedback,
            config: config.clone(),
        })
    }

    #[must_use]
    pub fn form(&self) -> &N {
        &self.form
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&N> {
        self.feedback.as_ref()
    }

    /// Handle a `submit` event fired by `form`.
    ///
    /// Returns `None` for forms this validator does not own; the caller
    /// must then leave the event alone.
    pub fn handle_submit<H: PageHost<Node = N>>(
        &self,
        host: &mut H,
        form: &N,
    ) -> Option<FormOutcome> {
        (*form == self.form).then(|| self.submit(host))
    }

    /// Validate the form, annotate fields, and report the outcome.
    pub fn submit<H: PageHost<Node = N>>(&self, host: &mut H) -> FormOutcome {
        let mut errors = Vec::new();

        for name in self.checked_fields() {
            let field = host.form_field(&self.form, name);
            let value = field
                .as_ref()
                .map(|f| host.field_value(f))
                .unwrap_or_default();
            let result = self.check(name, &value);
            if let Some(field) = &field {
                self.mark(host, field, result.is_invalid());
            }
            if let ValidationResult::Invalid(error) = result {
                crate::debug!(field = name, code = error.code, "field invalid");
                errors.push(FieldError {
                    field: name.to_string(),
                    error,
                });
            }
        }

        // Every marker is written; only now touch the feedback region.
        let rejection = (!errors.is_empty()).then(|| Rejection { errors });
        self.report(host, rejection.as_ref());
        match rejection {
            Some(rejection) => FormOutcome::Rejected(rejection),
            None => FormOutcome::Accepted,
        }
    }

    /// Required fields in order, then the email field if it is not among
    /// them.
    fn checked_fields(&self) -> impl Iterator<Item = &str> {
        let extra = self
            .config
            .email_field
            .as_deref()
            .filter(|email| !self.config.required_fields.iter().any(|r| r == email));
        self.config
            .required_fields
            .iter()
            .map(String::as_str)
            .chain(extra)
    }

    fn check(&self, name: &str, value: &str) -> ValidationResult {
        let mut result = ValidationResult::Valid;
        if self.config.required_fields.iter().any(|r| r == name) {
            result = Required::new().validate(value);
        }
        // Email shape is only checked on non-empty input.
        if self.config.email_field.as_deref() == Some(name) {
            result = result.and(Email::new().validate(value));
        }
        result
    }

    fn mark<H: PageHost<Node = N>>(&self, host: &mut H, field: &N, invalid: bool) {
        if invalid {
            host.add_class(field, &self.config.invalid_class);
            host.set_attribute(field, &self.config.invalid_attribute, "true");
        } else {
            host.remove_class(field, &self.config.invalid_class);
            host.remove_attribute(field, &self.config.invalid_attribute);
        }
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn report<H: PageHost<Node = N>>(&self, host: &mut H, rejection: Option<&Rejection>) {
        let (message, class_name) = match rejection {
            Some(rejection) => {
                crate::info!(invalid = rejection.errors.len(), "submission rejected");
                (&self.config.rejected_message, &self.config.error_class_name)
            }
            None => {
                crate::info!("submission accepted");
                (&self.config.accepted_message, &self.config.success_class_name)
            }
        };
        if let Some(feedback) = &self.feedback {
            host.set_text_content(feedback, message);
            host.set_class_name(feedback, class_name);
        }
        if rejection.is_none() {
            host.reset_form(&self.form);
        }
    }
}
