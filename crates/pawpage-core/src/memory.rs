#![forbid(unsafe_code)]

//! Deterministic in-memory document.
//!
//! [`MemoryDocument`] is an arena DOM implementing [`PageHost`] without a
//! browser. The host drives everything explicitly:
//!
//! - structure is built with [`MemoryDocument::append`] /
//!   [`MemoryDocument::append_with`],
//! - user typing is simulated with [`MemoryDocument::set_value`],
//! - time only moves when [`MemoryDocument::advance`] is called, which runs
//!   every deferred task that has come due,
//! - scrolls and icon refreshes are recorded for inspection.
//!
//! Focus follows browser rules closely enough for containment tests: only
//! interactive elements or elements carrying `tabindex` accept focus, and a
//! detached element never does.

use core::time::Duration;
use std::collections::HashMap;

use crate::host::{Deferred, IconRefresh, PageHost, ReadyState, ScrollBehavior};
use crate::selector::{ElementView, Selector};

/// Arena index of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attrs: Vec<(String, String)>,
    text: String,
    value: String,
    default_value: String,
}

impl Element {
    fn new(tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            parent,
            children: Vec::new(),
            attrs: Vec::new(),
            text: String::new(),
            value: String::new(),
            default_value: String::new(),
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| k != name);
    }

    fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    fn is_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea" | "select")
    }

    /// Mirrors [`crate::host::FOCUSABLE_SELECTOR`].
    fn is_tabbable(&self) -> bool {
        let disabled = self.attr("disabled").is_some();
        let by_tag = match self.tag.as_str() {
            "a" => self.attr("href").is_some(),
            "button" | "textarea" | "select" => !disabled,
            "input" => !disabled && self.attr("type") != Some("hidden"),
            _ => false,
        };
        by_tag || self.attr("tabindex").is_some_and(|t| t != "-1")
    }

    /// Programmatic `focus()` also works on `tabindex="-1"` elements.
    fn accepts_focus(&self) -> bool {
        self.is_tabbable() || self.attr("tabindex").is_some()
    }
}

impl ElementView for Element {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attr(name)
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    due: Duration,
    seq: u64,
    task: Deferred<NodeId>,
}

/// One recorded `scrollIntoView` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRecord {
    pub node: NodeId,
    pub behavior: ScrollBehavior,
}

/// Icon refresh stand-in counting its invocations.
#[derive(Debug, Default, Clone)]
pub struct RecordingIcons {
    calls: u32,
}

impl RecordingIcons {
    #[must_use]
    pub fn calls(&self) -> u32 {
        self.calls
    }
}

impl IconRefresh for RecordingIcons {
    fn refresh(&mut self) {
        self.calls += 1;
    }
}

/// Arena DOM with a host-controlled clock.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Element>,
    root: NodeId,
    body: NodeId,
    active: Option<NodeId>,
    ready_state: ReadyState,
    media: HashMap<String, bool>,
    now: Duration,
    next_seq: u64,
    timers: Vec<ScheduledTask>,
    scrolls: Vec<ScrollRecord>,
    icons: Option<RecordingIcons>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// An empty, fully loaded document with `<html><body>`.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![Element::new("html", None)],
            root: NodeId(0),
            body: NodeId(0),
            active: None,
            ready_state: ReadyState::Complete,
            media: HashMap::new(),
            now: Duration::ZERO,
            next_seq: 0,
            timers: Vec::new(),
            scrolls: Vec::new(),
            icons: None,
        };
        doc.body = doc.append(doc.root, "body");
        doc
    }

    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// Append a new element as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element::new(tag, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append an element with attributes. A `value` attribute on a control
    /// becomes both its current and its reset value.
    pub fn append_with(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.append(parent, tag);
        let el = &mut self.nodes[id.0];
        for (name, value) in attrs {
            el.set_attr(name, value);
        }
        if el.is_control()
            && let Some(initial) = el.attr("value").map(str::to_string)
        {
            el.value.clone_from(&initial);
            el.default_value = initial;
        }
        id
    }

    /// Detach `node` (and its subtree) from its parent.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
        if self.active.is_some_and(|a| !self.is_connected(a)) {
            self.active = None;
        }
    }

    /// Simulate the user editing a control.
    pub fn set_value(&mut self, node: NodeId, value: &str) {
        self.nodes[node.0].value = value.to_string();
    }

    #[must_use]
    pub fn value(&self, node: NodeId) -> &str {
        &self.nodes[node.0].value
    }

    #[must_use]
    pub fn text(&self, node: NodeId) -> &str {
        &self.nodes[node.0].text
    }

    /// Attribute lookup without going through the host trait.
    #[must_use]
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0].attr(name)
    }

    /// The `class` attribute, or `""`.
    #[must_use]
    pub fn class_name(&self, node: NodeId) -> &str {
        self.attr(node, "class").unwrap_or("")
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    /// Set the answer for a media query.
    pub fn set_media(&mut self, query: &str, matches: bool) {
        self.media.insert(query.to_string(), matches);
    }

    /// Expose an icon refresh capability.
    pub fn install_icons(&mut self) {
        self.icons = Some(RecordingIcons::default());
    }

    /// Calls made to the icon refresh capability, if installed.
    #[must_use]
    pub fn icon_refresh_calls(&self) -> Option<u32> {
        self.icons.as_ref().map(RecordingIcons::calls)
    }

    /// Set focus directly, as a user click or tab would.
    pub fn set_active(&mut self, node: Option<NodeId>) {
        self.active = node;
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Deferred tasks not yet run.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.timers.len()
    }

    /// Advance time by `dt`, running every task that comes due, in due order.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
        loop {
            let next = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due <= self.now)
                .min_by_key(|(_, t)| (t.due, t.seq))
                .map(|(i, _)| i);
            let Some(index) = next else {
                break;
            };
            let scheduled = self.timers.remove(index);
            scheduled.task.run(self);
        }
    }

    /// Drain recorded scrolls.
    pub fn take_scrolls(&mut self) -> Vec<ScrollRecord> {
        std::mem::take(&mut self.scrolls)
    }

    fn is_connected(&self, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == self.root {
                return true;
            }
            cur = self.nodes[id.0].parent;
        }
        false
    }

    /// Pre-order walk of `from`'s subtree, excluding `from` itself.
    fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[from.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }
}

impl PageHost for MemoryDocument {
    type Node = NodeId;

    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn query(&self, selector: &Selector) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|id| selector.matches(&self.nodes[id.0]))
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|n| self.nodes[n.0].attr("id") == Some(id))
    }

    fn closest(&self, node: &NodeId, selector: &Selector) -> Option<NodeId> {
        let mut cur = Some(*node);
        while let Some(id) = cur {
            if selector.matches(&self.nodes[id.0]) {
                return Some(id);
            }
            cur = self.nodes[id.0].parent;
        }
        None
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut cur = Some(*node);
        while let Some(id) = cur {
            if id == *ancestor {
                return true;
            }
            cur = self.nodes[id.0].parent;
        }
        false
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.nodes[node.0].attr(name).map(str::to_string)
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        self.nodes[node.0].set_attr(name, value);
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) {
        self.nodes[node.0].remove_attr(name);
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        ElementView::has_class(&self.nodes[node.0], class)
    }

    fn add_class(&mut self, node: &NodeId, class: &str) {
        let el = &mut self.nodes[node.0];
        if ElementView::has_class(el, class) {
            return;
        }
        let mut list: Vec<&str> = el.classes().collect();
        list.push(class);
        let joined = list.join(" ");
        el.set_attr("class", &joined);
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) {
        let el = &mut self.nodes[node.0];
        if el.attr("class").is_none() {
            return;
        }
        let joined = el.classes().filter(|c| *c != class).collect::<Vec<_>>().join(" ");
        el.set_attr("class", &joined);
    }

    fn set_class_name(&mut self, node: &NodeId, class_name: &str) {
        self.nodes[node.0].set_attr("class", class_name);
    }

    fn set_text_content(&mut self, node: &NodeId, text: &str) {
        let el = &mut self.nodes[node.0];
        el.children.clear();
        el.text = text.to_string();
    }

    fn focusable_within(&self, container: &NodeId) -> Vec<NodeId> {
        self.descendants(*container)
            .into_iter()
            .filter(|id| self.nodes[id.0].is_tabbable())
            .collect()
    }

    fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    fn focus(&mut self, node: &NodeId) {
        if self.nodes[node.0].accepts_focus() && self.is_connected(*node) {
            self.active = Some(*node);
        }
    }

    fn scroll_into_view(&mut self, node: &NodeId, behavior: ScrollBehavior) {
        self.scrolls.push(ScrollRecord {
            node: *node,
            behavior,
        });
    }

    fn matches_media(&self, query: &str) -> bool {
        self.media.get(query).copied().unwrap_or(false)
    }

    fn defer(&mut self, delay: Duration, task: Deferred<NodeId>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(ScheduledTask {
            due: self.now.saturating_add(delay),
            seq,
            task,
        });
    }

    fn form_field(&self, form: &NodeId, name: &str) -> Option<NodeId> {
        self.descendants(*form).into_iter().find(|id| {
            let el = &self.nodes[id.0];
            el.is_control() && el.attr("name") == Some(name)
        })
    }

    fn field_value(&self, field: &NodeId) -> String {
        let el = &self.nodes[field.0];
        if el.is_control() {
            el.value.clone()
        } else {
            String::new()
        }
    }

    fn reset_form(&mut self, form: &NodeId) {
        for id in self.descendants(*form) {
            let el = &mut self.nodes[id.0];
            if el.is_control() {
                el.value.clone_from(&el.default_value);
            }
        }
    }

    fn icon_refresh(&mut self) -> Option<&mut dyn IconRefresh> {
        self.icons.as_mut().map(|icons| icons as &mut dyn IconRefresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn query_is_document_order() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let first = doc.append_with(body, "section", &[("data-x", "1")]);
        let inner = doc.append_with(first, "div", &[("data-x", "2")]);
        let _second = doc.append_with(body, "div", &[("data-x", "3")]);

        let sel = Selector::has_attribute("data-x");
        assert_eq!(doc.query(&sel), Some(first));
        assert_eq!(doc.query(&Selector::element("div")), Some(inner));
    }

    #[test]
    fn closest_and_contains() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let nav = doc.append_with(body, "nav", &[("id", "mobile-menu")]);
        let link = doc.append_with(nav, "a", &[("href", "#top")]);
        let icon = doc.append(link, "span");

        assert_eq!(doc.closest(&icon, &Selector::element("a")), Some(link));
        assert_eq!(doc.closest(&icon, &Selector::element("button")), None);
        assert!(doc.contains(&nav, &icon));
        assert!(doc.contains(&nav, &nav));
        assert!(!doc.contains(&icon, &nav));
    }

    #[test]
    fn class_list_operations() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let el = doc.append_with(body, "div", &[("class", "a hidden b")]);

        doc.remove_class(&el, "hidden");
        assert_eq!(doc.class_name(el), "a b");
        doc.add_class(&el, "hidden");
        doc.add_class(&el, "hidden");
        assert_eq!(doc.class_name(el), "a b hidden");
        assert!(doc.has_class(&el, "hidden"));

        let bare = doc.append(body, "p");
        doc.remove_class(&bare, "hidden");
        assert_eq!(doc.attr(bare, "class"), None);
    }

    #[test]
    fn focusable_rules() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let panel = doc.append(body, "div");
        let link = doc.append_with(panel, "a", &[("href", "#a")]);
        let _plain_a = doc.append(panel, "a");
        let button = doc.append(panel, "button");
        let _disabled = doc.append_with(panel, "button", &[("disabled", "")]);
        let _hidden = doc.append_with(panel, "input", &[("type", "hidden")]);
        let tabbed = doc.append_with(panel, "div", &[("tabindex", "0")]);
        let _untabbed = doc.append_with(panel, "div", &[("tabindex", "-1")]);

        assert_eq!(doc.focusable_within(&panel), vec![link, button, tabbed]);
    }

    #[test]
    fn focus_requires_focusable_and_connected() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let div = doc.append(body, "div");
        let button = doc.append(body, "button");

        doc.focus(&div);
        assert_eq!(doc.active_element(), None);

        doc.set_attribute(&div, "tabindex", "-1");
        doc.focus(&div);
        assert_eq!(doc.active_element(), Some(div));

        doc.focus(&button);
        doc.detach(button);
        assert_eq!(doc.active_element(), None);
        doc.focus(&button);
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn deferred_tasks_run_when_due() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let el = doc.append_with(body, "section", &[("tabindex", "-1")]);

        doc.defer(
            Duration::from_millis(500),
            Deferred::RemoveAttribute {
                node: el,
                name: "tabindex".into(),
            },
        );
        assert_eq!(doc.pending_tasks(), 1);

        doc.advance(Duration::from_millis(499));
        assert_eq!(doc.attr(el, "tabindex"), Some("-1"));

        doc.advance(Duration::from_millis(1));
        assert_eq!(doc.attr(el, "tabindex"), None);
        assert_eq!(doc.pending_tasks(), 0);
        assert_eq!(doc.now(), Duration::from_millis(500));
    }

    #[test]
    fn form_controls_and_reset() {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let form = doc.append_with(body, "form", &[("id", "contact-form")]);
        let label = doc.append_with(form, "label", &[("name", "name")]);
        let name = doc.append_with(form, "input", &[("name", "name")]);
        let plan = doc.append_with(form, "input", &[("name", "plan"), ("value", "basic")]);

        assert_eq!(doc.form_field(&form, "name"), Some(name));
        assert_ne!(doc.form_field(&form, "name"), Some(label));
        assert_eq!(doc.form_field(&form, "missing"), None);

        doc.set_value(name, "Ana");
        doc.set_value(plan, "premium");
        assert_eq!(doc.field_value(&name), "Ana");
        assert_eq!(doc.field_value(&label), "");

        doc.reset_form(&form);
        assert_eq!(doc.value(name), "");
        assert_eq!(doc.value(plan), "basic");
    }

    #[test]
    fn media_and_icons() {
        let mut doc = MemoryDocument::new();
        assert!(!doc.matches_media("(prefers-reduced-motion: reduce)"));
        doc.set_media("(prefers-reduced-motion: reduce)", true);
        assert!(doc.matches_media("(prefers-reduced-motion: reduce)"));

        assert!(doc.icon_refresh().is_none());
        doc.install_icons();
        doc.icon_refresh().expect("installed").refresh();
        assert_eq!(doc.icon_refresh_calls(), Some(1));
    }
}
