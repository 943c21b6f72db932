#![forbid(unsafe_code)]

//! Accessible collapsible menu.
//!
//! [`MenuController`] owns the open/closed state of the mobile navigation
//! panel and keeps two DOM facts in lockstep with it: the panel's hidden
//! class and the toggle's `aria-expanded` attribute. Both are written by a
//! single method, so no event ever observes them disagreeing.
//!
//! # State machine
//!
//! ```text
//!            toggle                         toggle | Escape | panel link | outside click
//! Closed ───────────▶ Open ──────────────────────────────────────────────────────────▶ Closed
//!                      │ ▲
//!                      └─┘ Tab on last / Shift+Tab on first (focus wraps)
//! ```
//!
//! Opening focuses the first focusable element of the panel (or leaves focus
//! on the toggle when there is none). Every close returns focus to the
//! toggle.

use crate::config::MenuConfig;
use crate::event::{Disposition, KeyCode, KeyEvent};
use crate::host::PageHost;
use crate::selector::Selector;

/// Whether the panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

impl MenuState {
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }
}

/// Why the menu closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Toggle,
    Escape,
    PanelLink,
    Outside,
}

/// Observable result of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTransition {
    Opened,
    Closed(CloseReason),
    /// Focus wrapped around the panel boundary; state unchanged.
    FocusWrapped,
}

/// Controller for one toggle + panel pair.
#[derive(Debug, Clone)]
pub struct MenuController<N> {
    toggle: N,
    panel: N,
    container: N,
    state: MenuState,
    link: Selector,
    hidden_class: String,
    expanded_attribute: String,
}

impl<N: Clone + PartialEq + core::fmt::Debug> MenuController<N> {
    /// Resolve the menu elements and normalise the DOM to `Closed`.
    ///
    /// Returns `None`, wiring nothing, when the toggle or the panel is
    /// missing.
    pub fn wire<H: PageHost<Node = N>>(host: &mut H, config: &MenuConfig) -> Option<Self> {
        let Some(toggle) = host.query(&config.toggle) else {
            crate::debug!(selector = %config.toggle, "menu toggle not found; menu disabled");
            return None;
        };
        let Some(panel) = host.query(&config.panel) else {
            crate::debug!(selector = %config.panel, "menu panel not found; menu disabled");
            return None;
        };
        let container = config
            .container
            .as_ref()
            .and_then(|sel| host.query(sel))
            .filter(|c| host.contains(c, &panel))
            .unwrap_or_else(|| panel.clone());

        let controller = Self {
            toggle,
            panel,
            container,
            state: MenuState::Closed,
            link: config.link.clone(),
            hidden_class: config.hidden_class.clone(),
            expanded_attribute: config.expanded_attribute.clone(),
        };
        controller.apply(host);
        Some(controller)
    }

    #[must_use]
    pub const fn state(&self) -> MenuState {
        self.state
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.state.is_open()
    }

    #[must_use]
    pub fn toggle(&self) -> &N {
        &self.toggle
    }

    #[must_use]
    pub fn panel(&self) -> &N {
        &self.panel
    }

    /// The element scoping outside-click detection (the panel when no
    /// container is configured or present).
    #[must_use]
    pub fn container(&self) -> &N {
        &self.container
    }

    /// Flip the state as a toggle activation would.
    pub fn activate_toggle<H: PageHost<Node = N>>(&mut self, host: &mut H) -> MenuTransition {
        if self.is_open() {
            self.close(host, CloseReason::Toggle)
        } else {
            self.open(host)
        }
    }

    /// Show the panel and move focus into it.
    pub fn open<H: PageHost<Node = N>>(&mut self, host: &mut H) -> MenuTransition {
        self.state = MenuState::Open;
        self.apply(host);
        match host.focusable_within(&self.panel).first() {
            Some(first) => host.focus(first),
            None => host.focus(&self.toggle),
        }
        crate::debug!("menu opened");
        MenuTransition::Opened
    }

    /// Hide the panel and return focus to the toggle.
    pub fn close<H: PageHost<Node = N>>(
        &mut self,
        host: &mut H,
        reason: CloseReason,
    ) -> MenuTransition {
        self.state = MenuState::Closed;
        self.apply(host);
        host.focus(&self.toggle);
        crate::debug!(?reason, "menu closed");
        MenuTransition::Closed(reason)
    }

    /// Handle a pointer activation anywhere in the document.
    ///
    /// At most one transition happens per call.
    pub fn handle_click<H: PageHost<Node = N>>(
        &mut self,
        host: &mut H,
        target: &N,
    ) -> Option<MenuTransition> {
        if host.contains(&self.toggle, target) {
            return Some(self.activate_toggle(host));
        }
        if !self.is_open() {
            return None;
        }
        if host.contains(&self.panel, target) {
            let link = host.closest(target, &self.link)?;
            if !host.contains(&self.panel, &link) {
                return None;
            }
            return Some(self.close(host, CloseReason::PanelLink));
        }
        if !host.contains(&self.container, target) {
            return Some(self.close(host, CloseReason::Outside));
        }
        None
    }

    /// Handle a key press: Escape closes, Tab is contained while open.
    pub fn handle_key<H: PageHost<Node = N>>(
        &mut self,
        host: &mut H,
        key: &KeyEvent,
    ) -> (Option<MenuTransition>, Disposition) {
        if !self.is_open() {
            return (None, Disposition::Default);
        }
        if key.code == KeyCode::Escape {
            return (
                Some(self.close(host, CloseReason::Escape)),
                Disposition::Default,
            );
        }

        let backward = key.is_tab_backward();
        if !backward && !key.is_tab_forward() {
            return (None, Disposition::Default);
        }

        // Recomputed on every Tab: links may have been added or removed.
        let focusable = host.focusable_within(&self.panel);
        let (Some(first), Some(last)) = (focusable.first(), focusable.last()) else {
            return (None, Disposition::Default);
        };
        let active = host.active_element();

        let wrap_to = if backward && active.as_ref() == Some(first) {
            last
        } else if !backward && active.as_ref() == Some(last) {
            first
        } else {
            return (None, Disposition::Default);
        };
        host.focus(wrap_to);
        crate::trace!(backward, count = focusable.len(), "menu focus wrapped");
        (Some(MenuTransition::FocusWrapped), Disposition::PreventDefault)
    }

    /// Write the state into the DOM: hidden class and expanded attribute
    /// together.
    fn apply<H: PageHost<Node = N>>(&self, host: &mut H) {
        let open = self.is_open();
        if open {
            host.remove_class(&self.panel, &self.hidden_class);
        } else {
            host.add_class(&self.panel, &self.hidden_class);
        }
        host.set_attribute(
            &self.toggle,
            &self.expanded_attribute,
            if open { "true" } else { "false" },
        );
    }
}
