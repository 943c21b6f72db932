#![forbid(unsafe_code)]

//! Same-page fragment navigation.
//!
//! Activating `<a href="#pricing">` scrolls the element with id `pricing`
//! to the top of the viewport and moves focus onto it, so screen readers
//! continue reading from the target instead of from the link. Targets that
//! are not natively focusable get a temporary `tabindex="-1"`, removed again
//! once the scroll has settled.

use crate::config::AnchorConfig;
use crate::event::Disposition;
use crate::host::{Deferred, PageHost, ScrollBehavior};

/// What a click meant to the navigator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorOutcome {
    /// Target is not inside a fragment link.
    NotAnchor,
    /// `href="#"`: left to the browser.
    BareFragment,
    /// No element carries the fragment as its id: left to the browser.
    Unresolved { fragment: String },
    /// Focus moved and the target was scrolled into view.
    Navigated {
        fragment: String,
        behavior: ScrollBehavior,
    },
}

impl AnchorOutcome {
    /// Only a completed navigation cancels the native action.
    #[must_use]
    pub fn disposition(&self) -> Disposition {
        match self {
            Self::Navigated { .. } => Disposition::PreventDefault,
            _ => Disposition::Default,
        }
    }

    #[must_use]
    pub fn navigated(&self) -> bool {
        matches!(self, Self::Navigated { .. })
    }
}

/// Intercepts fragment links and performs accessible scroll-to-target.
#[derive(Debug, Clone)]
pub struct AnchorNavigator {
    config: AnchorConfig,
}

impl AnchorNavigator {
    #[must_use]
    pub fn new(config: AnchorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &AnchorConfig {
        &self.config
    }

    /// Handle a click whose target may sit inside a fragment link.
    pub fn handle_click<H: PageHost>(&self, host: &mut H, target: &H::Node) -> AnchorOutcome {
        let Some(link) = host.closest(target, &self.config.link) else {
            return AnchorOutcome::NotAnchor;
        };
        let href = host.attribute(&link, "href").unwrap_or_default();
        self.navigate_to(host, &href)
    }

    /// Navigate to `href` as if a link carrying it had been activated.
    pub fn navigate_to<H: PageHost>(&self, host: &mut H, href: &str) -> AnchorOutcome {
        let Some(fragment) = href.strip_prefix('#') else {
            return AnchorOutcome::NotAnchor;
        };
        if fragment.is_empty() {
            return AnchorOutcome::BareFragment;
        }
        let Some(target) = host.element_by_id(fragment) else {
            crate::debug!(fragment, "fragment target not found; using default navigation");
            return AnchorOutcome::Unresolved {
                fragment: fragment.to_string(),
            };
        };

        let reduced_motion = host.matches_media(&self.config.reduced_motion_query);
        let behavior = if reduced_motion {
            ScrollBehavior::Instant
        } else {
            ScrollBehavior::Smooth
        };

        // A tabindex the page set itself is never touched.
        let temporary = host.attribute(&target, "tabindex").is_none();
        if temporary {
            host.set_attribute(&target, "tabindex", "-1");
        }
        host.focus(&target);
        host.scroll_into_view(&target, behavior);

        if temporary {
            if reduced_motion {
                host.remove_attribute(&target, "tabindex");
            } else {
                host.defer(
                    self.config.focus_cleanup_delay(),
                    Deferred::RemoveAttribute {
                        node: target,
                        name: "tabindex".to_string(),
                    },
                );
            }
        }

        crate::debug!(fragment, ?behavior, "navigated to fragment");
        AnchorOutcome::Navigated {
            fragment: fragment.to_string(),
            behavior,
        }
    }
}
