#![forbid(unsafe_code)]

//! The page host abstraction.
//!
//! Components never touch a concrete DOM. They talk to a [`PageHost`], which
//! the web crate implements over `web-sys` and [`crate::memory`] implements
//! deterministically for tests. All operations are infallible from the
//! caller's point of view: a host that cannot perform an operation (a node
//! that is not an `HTMLElement`, a detached element) silently does nothing.

use core::fmt;
use core::time::Duration;

use crate::selector::Selector;

/// CSS for the interactive elements considered by focus containment.
///
/// Hosts with a CSS engine query this directly; [`crate::memory`] applies
/// the same rules by hand.
pub const FOCUSABLE_SELECTOR: &str = "a[href], button:not([disabled]), textarea:not([disabled]), \
     input:not([disabled]):not([type=\"hidden\"]), select:not([disabled]), \
     [tabindex]:not([tabindex=\"-1\"])";

/// `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Map the DOM string; unknown values count as loaded.
    #[must_use]
    pub fn from_dom(state: &str) -> Self {
        match state {
            "loading" => Self::Loading,
            "interactive" => Self::Interactive,
            _ => Self::Complete,
        }
    }

    /// Whether the structural content is available.
    #[must_use]
    pub const fn is_parsed(self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// How `scrollIntoView` animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Work scheduled to run after a delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred<N> {
    /// Remove attribute `name` from `node`.
    RemoveAttribute { node: N, name: String },
}

impl<N> Deferred<N> {
    /// Execute the task against `host`.
    pub fn run<H: PageHost<Node = N> + ?Sized>(self, host: &mut H) {
        match self {
            Self::RemoveAttribute { node, name } => host.remove_attribute(&node, &name),
        }
    }
}

/// An externally supplied icon replacement routine.
pub trait IconRefresh {
    /// Replace icon placeholders on the page.
    fn refresh(&mut self);
}

/// Everything the page controller needs from its environment.
pub trait PageHost {
    /// Element handle.
    type Node: Clone + PartialEq + fmt::Debug;

    fn ready_state(&self) -> ReadyState;

    /// First element in document order matching `selector`.
    fn query(&self, selector: &Selector) -> Option<Self::Node>;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Nearest inclusive ancestor of `node` matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &Selector) -> Option<Self::Node>;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn add_class(&mut self, node: &Self::Node, class: &str);
    fn remove_class(&mut self, node: &Self::Node, class: &str);
    /// Replace the whole `className`.
    fn set_class_name(&mut self, node: &Self::Node, class_name: &str);

    fn set_text_content(&mut self, node: &Self::Node, text: &str);

    /// Interactive descendants of `container` in document order, computed
    /// from the live tree on every call.
    fn focusable_within(&self, container: &Self::Node) -> Vec<Self::Node>;

    fn active_element(&self) -> Option<Self::Node>;
    fn focus(&mut self, node: &Self::Node);

    /// Scroll `node` to the top of the viewport.
    fn scroll_into_view(&mut self, node: &Self::Node, behavior: ScrollBehavior);

    /// Evaluate a media query such as `(prefers-reduced-motion: reduce)`.
    fn matches_media(&self, query: &str) -> bool;

    /// Run `task` once after `delay`.
    fn defer(&mut self, delay: Duration, task: Deferred<Self::Node>);

    /// Control named `name` inside `form`.
    fn form_field(&self, form: &Self::Node, name: &str) -> Option<Self::Node>;

    /// Current value of a form control; empty for non-controls.
    fn field_value(&self, field: &Self::Node) -> String;

    /// Restore every control of `form` to its initial value.
    fn reset_form(&mut self, form: &Self::Node);

    /// The optional icon refresh capability.
    fn icon_refresh(&mut self) -> Option<&mut dyn IconRefresh> {
        None
    }
}
