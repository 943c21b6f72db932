#![forbid(unsafe_code)]

//! Page lifecycle root.
//!
//! A [`Page`] is created once per page load. The host reports lifecycle
//! signals through [`Page::on_lifecycle`]; the first signal arriving while
//! the document is parsed wires every component exactly once. Afterwards the
//! host forwards each delegated DOM event to [`Page::dispatch`] and applies
//! the returned [`Disposition`].
//!
//! ```rust
//! use pawpage_core::config::PageConfig;
//! use pawpage_core::event::PageEvent;
//! use pawpage_core::host::{PageHost, ReadyState};
//! use pawpage_core::memory::MemoryDocument;
//! use pawpage_core::page::{BootStatus, Lifecycle, Page};
//!
//! let mut doc = MemoryDocument::new();
//! let body = doc.body();
//! let toggle = doc.append_with(body, "button", &[("data-menu-toggle", "")]);
//! doc.append_with(body, "nav", &[("id", "mobile-menu")]);
//! doc.set_ready_state(ReadyState::Loading);
//!
//! let mut page = Page::new(PageConfig::default());
//! assert_eq!(page.on_lifecycle(&mut doc, Lifecycle::ScriptLoaded), BootStatus::Deferred);
//! doc.set_ready_state(ReadyState::Interactive);
//! assert!(matches!(
//!     page.on_lifecycle(&mut doc, Lifecycle::DomContentLoaded),
//!     BootStatus::Booted(_)
//! ));
//!
//! page.dispatch(&mut doc, PageEvent::Click { target: toggle });
//! assert_eq!(doc.attribute(&toggle, "aria-expanded").as_deref(), Some("true"));
//! ```

use serde::Serialize;

use crate::anchor::AnchorNavigator;
use crate::config::PageConfig;
use crate::event::{Disposition, PageEvent};
use crate::form::FormValidator;
use crate::host::PageHost;
use crate::menu::{MenuController, MenuTransition};

/// Lifecycle signals a host can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// The controller script has just been evaluated.
    ScriptLoaded,
    /// `DOMContentLoaded` fired.
    DomContentLoaded,
}

/// What wiring found on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootReport {
    /// Toggle and panel were both present.
    pub menu: bool,
    /// The optional container was found and scopes outside clicks.
    pub menu_container: bool,
    /// The contact form was present.
    pub form: bool,
    /// The feedback region was present.
    pub feedback: bool,
    /// The icon refresh capability existed and was invoked.
    pub icons_refreshed: bool,
}

impl BootReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Result of a lifecycle signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootStatus {
    /// Components were wired just now.
    Booted(BootReport),
    /// The document is still loading; wait for `DomContentLoaded`.
    Deferred,
    /// Already wired earlier; nothing was done.
    AlreadyBooted,
}

#[derive(Debug)]
struct Wired<N> {
    menu: Option<MenuController<N>>,
    anchors: AnchorNavigator,
    form: Option<FormValidator<N>>,
    report: BootReport,
}

#[derive(Debug)]
enum Phase<N> {
    Waiting,
    Booted(Wired<N>),
}

/// One page session.
#[derive(Debug)]
pub struct Page<N> {
    config: PageConfig,
    phase: Phase<N>,
}

impl<N: Clone + PartialEq + core::fmt::Debug> Page<N> {
    #[must_use]
    pub fn new(config: PageConfig) -> Self {
        Self {
            config,
            phase: Phase::Waiting,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub fn is_booted(&self) -> bool {
        matches!(self.phase, Phase::Booted(_))
    }

    /// Wiring summary, once booted.
    #[must_use]
    pub fn report(&self) -> Option<&BootReport> {
        match &self.phase {
            Phase::Booted(wired) => Some(&wired.report),
            Phase::Waiting => None,
        }
    }

    #[must_use]
    pub fn menu(&self) -> Option<&MenuController<N>> {
        match &self.phase {
            Phase::Booted(wired) => wired.menu.as_ref(),
            Phase::Waiting => None,
        }
    }

    #[must_use]
    pub fn form(&self) -> Option<&FormValidator<N>> {
        match &self.phase {
            Phase::Booted(wired) => wired.form.as_ref(),
            Phase::Waiting => None,
        }
    }

    /// React to a lifecycle signal. Safe to call any number of times.
    pub fn on_lifecycle<H: PageHost<Node = N>>(
        &mut self,
        host: &mut H,
        signal: Lifecycle,
    ) -> BootStatus {
        if self.is_booted() {
            crate::trace!(?signal, "already booted");
            return BootStatus::AlreadyBooted;
        }
        if signal == Lifecycle::ScriptLoaded && !host.ready_state().is_parsed() {
            crate::debug!("document still loading; deferring boot");
            return BootStatus::Deferred;
        }
        let wired = self.wire(host);
        let report = wired.report;
        self.phase = Phase::Booted(wired);
        BootStatus::Booted(report)
    }

    fn wire<H: PageHost<Node = N>>(&self, host: &mut H) -> Wired<N> {
        let menu = MenuController::wire(host, &self.config.menu);
        let anchors = AnchorNavigator::new(self.config.anchors.clone());
        let form = FormValidator::wire(host, &self.config.form);

        let mut report = BootReport {
            menu: menu.is_some(),
            menu_container: menu.as_ref().is_some_and(|m| m.container() != m.panel()),
            form: form.is_some(),
            feedback: form.as_ref().is_some_and(|f| f.feedback().is_some()),
            icons_refreshed: false,
        };

        // Icons go last so they see the final markup.
        if self.config.refresh_icons
            && let Some(icons) = host.icon_refresh()
        {
            icons.refresh();
            report.icons_refreshed = true;
        }

        crate::info!(
            menu = report.menu,
            form = report.form,
            feedback = report.feedback,
            icons = report.icons_refreshed,
            "page wired"
        );
        Wired {
            menu,
            anchors,
            form,
            report,
        }
    }

    /// Route one DOM event through the wired components.
    ///
    /// Before boot every event is left to the browser.
    pub fn dispatch<H: PageHost<Node = N>>(
        &mut self,
        host: &mut H,
        event: PageEvent<N>,
    ) -> Disposition {
        let Phase::Booted(wired) = &mut self.phase else {
            return Disposition::Default;
        };
        match event {
            PageEvent::Click { target } => {
                if let Some(menu) = wired.menu.as_mut()
                    && let Some(transition) = menu.handle_click(host, &target)
                {
                    log_transition(transition);
                }
                // Anchor behaviour runs after the menu so an in-panel link
                // leaves focus on its target, not on the toggle.
                wired.anchors.handle_click(host, &target).disposition()
            }
            PageEvent::KeyDown(key) => match wired.menu.as_mut() {
                Some(menu) => {
                    let (transition, disposition) = menu.handle_key(host, &key);
                    if let Some(transition) = transition {
                        log_transition(transition);
                    }
                    disposition
                }
                None => Disposition::Default,
            },
            // Our form never submits natively, whatever the outcome.
            PageEvent::Submit { form } => match wired.form.as_ref() {
                Some(validator) if validator.handle_submit(host, &form).is_some() => {
                    Disposition::PreventDefault
                }
                _ => Disposition::Default,
            },
        }
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn log_transition(transition: MenuTransition) {
    crate::trace!(?transition, "menu transition");
}
