#![forbid(unsafe_code)]

//! Page configuration.
//!
//! Every marker, class name, ARIA attribute and message the controller
//! touches lives here. [`PageConfig::default`] reproduces the shipped site;
//! hosts may override any subset with a camelCase JSON document:
//!
//! ```rust
//! use pawpage_core::config::PageConfig;
//!
//! let config = PageConfig::from_json_str(r#"{ "anchors": { "focusCleanupMs": 300 } }"#).unwrap();
//! assert_eq!(config.anchors.focus_cleanup_ms, 300);
//! assert_eq!(config.menu.hidden_class, "hidden");
//! ```

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::selector::{AttrMatch, Selector};

/// Text shown when a submission is rejected.
pub const REJECTED_MESSAGE: &str = "Please complete all required fields with valid information.";
/// Text shown when a submission is accepted. No handler is wired behind it.
pub const ACCEPTED_MESSAGE: &str =
    "Thank you! Your message has been recorded. TODO: Connect to production handler.";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    pub menu: MenuConfig,
    pub anchors: AnchorConfig,
    pub form: FormConfig,
    /// Invoke the host's icon refresh capability after wiring, if present.
    pub refresh_icons: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            menu: MenuConfig::default(),
            anchors: AnchorConfig::default(),
            form: FormConfig::default(),
            refresh_icons: true,
        }
    }
}

impl PageConfig {
    /// Parse a JSON override and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON (every field, defaults included).
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        class_token("menu.hiddenClass", &self.menu.hidden_class)?;
        attribute_name("menu.expandedAttribute", &self.menu.expanded_attribute)?;
        class_token("form.invalidClass", &self.form.invalid_class)?;
        attribute_name("form.invalidAttribute", &self.form.invalid_attribute)?;

        if self.form.required_fields.is_empty() {
            return Err(ConfigError::NoRequiredFields);
        }
        if let Some(index) = self
            .form
            .required_fields
            .iter()
            .position(|name| name.trim().is_empty())
        {
            return Err(ConfigError::EmptyFieldName { index });
        }
        let mut names = self.form.required_fields.iter().chain(&self.form.email_field);
        if let Some(bad) = names.find(|name| name.contains(['"', '\\'])) {
            return Err(ConfigError::InvalidFieldName { value: bad.clone() });
        }
        Ok(())
    }
}

fn class_token(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidClassToken {
            key,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn attribute_name(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidAttributeName {
            key,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Collapsible mobile menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuConfig {
    /// Control that opens and closes the panel.
    pub toggle: Selector,
    /// The collapsible panel.
    pub panel: Selector,
    /// Optional wrapper scoping outside-click detection. Falls back to the
    /// panel when absent from the page.
    pub container: Option<Selector>,
    /// Links inside the panel that close it when activated.
    pub link: Selector,
    /// Class present on the panel while closed.
    pub hidden_class: String,
    /// Attribute on the toggle mirroring the open state.
    pub expanded_attribute: String,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            toggle: Selector::has_attribute("data-menu-toggle"),
            panel: Selector::id("mobile-menu"),
            container: Some(Selector::has_attribute("data-menu-container")),
            link: Selector::element("a"),
            hidden_class: "hidden".to_string(),
            expanded_attribute: "aria-expanded".to_string(),
        }
    }
}

/// Same-page fragment links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnchorConfig {
    /// Links handled by the navigator.
    pub link: Selector,
    /// Delay before the temporary `tabindex` is removed after a smooth
    /// scroll, in milliseconds.
    pub focus_cleanup_ms: u64,
    /// Media query signalling a reduced-motion preference.
    pub reduced_motion_query: String,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            link: Selector::element("a").and_attribute("href", AttrMatch::Prefix("#".into())),
            focus_cleanup_ms: 500,
            reduced_motion_query: "(prefers-reduced-motion: reduce)".to_string(),
        }
    }
}

impl AnchorConfig {
    #[must_use]
    pub fn focus_cleanup_delay(&self) -> Duration {
        Duration::from_millis(self.focus_cleanup_ms)
    }
}

/// Contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormConfig {
    pub form: Selector,
    /// Region receiving the outcome message. Optional on the page.
    pub feedback: Selector,
    /// Field `name`s that must be non-empty, in annotation order.
    pub required_fields: Vec<String>,
    /// Field additionally checked for an email shape when non-empty.
    pub email_field: Option<String>,
    /// Class added to invalid fields.
    pub invalid_class: String,
    /// Attribute set to `"true"` on invalid fields.
    pub invalid_attribute: String,
    /// Full `className` of the feedback region after a rejection.
    pub error_class_name: String,
    /// Full `className` of the feedback region after acceptance.
    pub success_class_name: String,
    pub rejected_message: String,
    pub accepted_message: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            form: Selector::id("contact-form"),
            feedback: Selector::id("form-feedback"),
            required_fields: ["name", "email", "petDetails", "message"]
                .map(String::from)
                .to_vec(),
            email_field: Some("email".to_string()),
            invalid_class: "border-red-400".to_string(),
            invalid_attribute: "aria-invalid".to_string(),
            error_class_name: "text-sm text-red-600 mt-2".to_string(),
            success_class_name: "text-sm text-green-600 mt-2".to_string(),
            rejected_message: REJECTED_MESSAGE.to_string(),
            accepted_message: ACCEPTED_MESSAGE.to_string(),
        }
    }
}
